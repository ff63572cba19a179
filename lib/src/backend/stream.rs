//! Stream module.
//!
//! This module contains the transport shared by the protocol
//! adapters: a plain or TLS TCP stream carrying an I/O timeout.

use log::debug;
use native_tls::{TlsConnector, TlsStream};
use std::{
    io::{self, Read, Write},
    net::{TcpStream, ToSocketAddrs},
    time::Duration,
};

#[derive(Debug)]
pub enum MailStream {
    Plain(TcpStream),
    Tls(TlsStream<TcpStream>),
}

impl Read for MailStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Plain(stream) => stream.read(buf),
            Self::Tls(stream) => stream.read(buf),
        }
    }
}

impl Write for MailStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(stream) => stream.write(buf),
            Self::Tls(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(stream) => stream.flush(),
            Self::Tls(stream) => stream.flush(),
        }
    }
}

/// Applies the read and write timeout to an already connected
/// stream. A zero timeout means blocking forever.
pub fn set_timeout(tcp: &TcpStream, timeout: Duration) -> io::Result<()> {
    let timeout = if timeout.is_zero() { None } else { Some(timeout) };
    tcp.set_read_timeout(timeout)?;
    tcp.set_write_timeout(timeout)?;
    Ok(())
}

/// Connects to the first reachable address of `host:port`.
pub fn connect_tcp(host: &str, port: u16, timeout: Duration) -> io::Result<TcpStream> {
    debug!("connect to {}:{} (timeout: {:?})", host, port, timeout);

    let mut last_err = None;
    for addr in (host, port).to_socket_addrs()? {
        let tcp = if timeout.is_zero() {
            TcpStream::connect(addr)
        } else {
            TcpStream::connect_timeout(&addr, timeout)
        };
        match tcp {
            Ok(tcp) => {
                set_timeout(&tcp, timeout)?;
                return Ok(tcp);
            }
            Err(err) => {
                debug!("cannot connect to {}: {}", addr, err);
                last_err = Some(err);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("cannot resolve address of {}", host),
        )
    }))
}

pub fn tls_connector(insecure: bool) -> native_tls::Result<TlsConnector> {
    debug!("create TLS connector (insecure: {})", insecure);
    TlsConnector::builder()
        .danger_accept_invalid_certs(insecure)
        .danger_accept_invalid_hostnames(insecure)
        .build()
}
