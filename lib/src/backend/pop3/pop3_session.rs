//! POP3 session module.
//!
//! This module speaks the POP3 line protocol (RFC 1939) over a
//! [`MailStream`]: single-line `+OK`/`-ERR` status replies and
//! dot-terminated multi-line replies.

use log::{debug, trace};
use std::{
    io::{BufRead, BufReader, Write},
    time::Duration,
};

use crate::backend::{connect_tcp, pop3::Error, pop3::Result, tls_connector, MailStream};

/// Message count and mailbox size in octets, as reported by `STAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pop3Stat {
    pub count: u32,
    pub size: u64,
}

pub struct Pop3Session {
    stream: BufReader<MailStream>,
}

impl Pop3Session {
    /// Connects to the server and consumes its greeting.
    pub fn connect(
        host: &str,
        port: u16,
        ssl: bool,
        insecure: bool,
        timeout: Duration,
    ) -> Result<Self> {
        let tcp = connect_tcp(host, port, timeout)
            .map_err(|err| Error::ConnectPop3ServerError(err, host.to_owned(), port))?;
        let stream = if ssl {
            let connector = tls_connector(insecure).map_err(Error::CreateTlsConnectorError)?;
            let tls = connector
                .connect(host, tcp)
                .map_err(|err| Error::TlsHandshakeError(host.to_owned(), err.to_string()))?;
            MailStream::Tls(tls)
        } else {
            MailStream::Plain(tcp)
        };

        let mut sess = Self::from_stream(stream);
        let greeting = sess
            .read_line("greeting")
            .map_err(|err| Error::GreetingError(err.to_string()))?;
        if !greeting.starts_with("+OK") {
            return Err(Error::GreetingError(greeting));
        }
        debug!("pop3 greeting: {}", greeting);

        Ok(sess)
    }

    /// Wraps an already connected stream whose greeting has not been
    /// read yet.
    pub fn from_stream(stream: MailStream) -> Self {
        Self {
            stream: BufReader::new(stream),
        }
    }

    pub fn login(&mut self, user: &str, passwd: &str) -> Result<()> {
        self.send(&format!("USER {}", user), "USER")?;
        let reply = self.read_line("USER")?;
        if !reply.starts_with("+OK") {
            return Err(Error::LoginPop3ServerError(user.to_owned(), reply));
        }

        self.send(&format!("PASS {}", passwd), "PASS")?;
        let reply = self.read_line("PASS")?;
        if !reply.starts_with("+OK") {
            return Err(Error::LoginPop3ServerError(user.to_owned(), reply));
        }

        debug!("logged in as {}", user);
        Ok(())
    }

    pub fn stat(&mut self) -> Result<Pop3Stat> {
        let reply = self.command("STAT")?;
        let mut parts = reply.split_whitespace().skip(1);
        let count = parts.next().and_then(|count| count.parse().ok());
        let size = parts.next().and_then(|size| size.parse().ok());
        match (count, size) {
            (Some(count), Some(size)) => Ok(Pop3Stat { count, size }),
            _ => Err(Error::ParseStatError(reply)),
        }
    }

    /// Retrieves the headers of a message plus its first `lines` body
    /// lines.
    pub fn top(&mut self, id: u32, lines: u32) -> Result<Vec<u8>> {
        self.command(&format!("TOP {} {}", id, lines))?;
        self.read_multiline("TOP")
    }

    pub fn retr(&mut self, id: u32) -> Result<Vec<u8>> {
        self.command(&format!("RETR {}", id))?;
        self.read_multiline("RETR")
    }

    pub fn dele(&mut self, id: u32) -> Result<()> {
        self.command(&format!("DELE {}", id))?;
        Ok(())
    }

    pub fn rset(&mut self) -> Result<()> {
        self.command("RSET")?;
        Ok(())
    }

    /// Ends the session. The server commits every message marked by
    /// `DELE` since the last `RSET`.
    pub fn quit(mut self) -> Result<()> {
        self.command("QUIT")?;
        Ok(())
    }

    fn command(&mut self, cmd: &str) -> Result<String> {
        self.send(cmd, cmd)?;
        let reply = self.read_line(cmd)?;
        if reply.starts_with("+OK") {
            Ok(reply)
        } else {
            Err(Error::NegativeResponseError(cmd.to_owned(), reply))
        }
    }

    fn send(&mut self, line: &str, label: &str) -> Result<()> {
        trace!("pop3 >> {}", label);
        let stream = self.stream.get_mut();
        stream
            .write_all(line.as_bytes())
            .and_then(|()| stream.write_all(b"\r\n"))
            .and_then(|()| stream.flush())
            .map_err(|err| Error::SendCmdError(err, label.to_owned()))
    }

    fn read_line(&mut self, label: &str) -> Result<String> {
        let mut buf = Vec::new();
        self.read_raw_line(&mut buf, label)?;
        let line = String::from_utf8_lossy(&buf).trim_end().to_owned();
        trace!("pop3 << {}", line);
        Ok(line)
    }

    fn read_raw_line(&mut self, buf: &mut Vec<u8>, label: &str) -> Result<()> {
        buf.clear();
        let n = self
            .stream
            .read_until(b'\n', buf)
            .map_err(|err| Error::ReadResponseError(err, label.to_owned()))?;
        if n == 0 {
            return Err(Error::ReadResponseError(
                std::io::ErrorKind::UnexpectedEof.into(),
                label.to_owned(),
            ));
        }
        Ok(())
    }

    /// Reads a multi-line reply up to the terminating ".", removing
    /// the byte-stuffed leading dots.
    fn read_multiline(&mut self, label: &str) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut line = Vec::new();
        loop {
            self.read_raw_line(&mut line, label)?;
            let content = line
                .strip_suffix(b"\r\n")
                .or_else(|| line.strip_suffix(b"\n"))
                .unwrap_or(&line);
            if content == b"." {
                break;
            }
            let content = content.strip_prefix(b".").unwrap_or(content);
            out.extend_from_slice(content);
            out.extend_from_slice(b"\r\n");
        }
        trace!("pop3 << {} octets", out.len());
        Ok(out)
    }
}
