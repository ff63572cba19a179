//! Mbox file module.
//!
//! Messages are appended in the mboxrd flavour: each one starts with
//! a `From ` separator line, and body lines looking like a separator
//! are quoted with `>`.

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use mailaid_lib::msg::Envelope;
use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Write},
    path::Path,
};

const MBOX_DATETIME_FMT: &str = "%a %b %e %H:%M:%S %Y";

pub struct MboxWriter<W: Write> {
    writer: W,
}

impl MboxWriter<BufWriter<File>> {
    /// Opens the given mbox file for appending, creating it if needed.
    pub fn append(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("cannot open mbox file {:?}", path))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> MboxWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write(&mut self, envelope: &Envelope) -> Result<()> {
        let (_, addr) = envelope.sender_addr();
        let addr = if addr.is_empty() { "MAILER-DAEMON" } else { addr };
        let date = envelope
            .date()
            .unwrap_or_else(|| DateTime::<FixedOffset>::from(Utc::now()))
            .with_timezone(&Utc);
        writeln!(self.writer, "From {} {}", addr, date.format(MBOX_DATETIME_FMT))
            .context("cannot write mbox separator")?;

        // Bytes are kept as they are: bodies may use any 8-bit charset.
        let raw = envelope.raw();
        if !raw.is_empty() {
            let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
            for line in raw.split(|b| *b == b'\n') {
                let line = line.strip_suffix(b"\r").unwrap_or(line);
                if is_from_line(line) {
                    self.writer.write_all(b">")?;
                }
                self.writer
                    .write_all(line)
                    .and_then(|()| self.writer.write_all(b"\n"))
                    .context("cannot write mbox message")?;
            }
        }
        writeln!(self.writer).context("cannot write mbox message")?;

        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("cannot flush mbox file")
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Matches `From ` lines, including already quoted ones.
fn is_from_line(line: &[u8]) -> bool {
    let start = line.iter().position(|b| *b != b'>').unwrap_or(line.len());
    line[start..].starts_with(b"From ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_should_write_mboxrd_messages() {
        let raw = "From: Alice <alice@localhost>\r\n\
                   Date: Fri, 05 Jan 2024 12:00:00 +0100\r\n\
                   Subject: quote\r\n\
                   \r\n\
                   From now on\r\n\
                   >From the past\r\n\
                   Fromage\r\n";
        let mut mbox = MboxWriter::new(Vec::new());
        mbox.write(&Envelope::new(1, raw.as_bytes().to_vec())).unwrap();
        let content = String::from_utf8(mbox.into_inner()).unwrap();

        assert_eq!(
            "From alice@localhost Fri Jan  5 11:00:00 2024\n\
             From: Alice <alice@localhost>\n\
             Date: Fri, 05 Jan 2024 12:00:00 +0100\n\
             Subject: quote\n\
             \n\
             >From now on\n\
             >>From the past\n\
             Fromage\n\
             \n",
            content
        );
    }

    #[test]
    fn it_should_keep_8bit_bodies_untouched() {
        let raw = b"From: bob@localhost\r\nSubject: latin\r\n\r\ncaf\xe9\r\nFrom \xc4\xe3\r\n".to_vec();
        let mut mbox = MboxWriter::new(Vec::new());
        mbox.write(&Envelope::new(1, raw)).unwrap();
        let content = mbox.into_inner();

        assert!(content.ends_with(b"\n\ncaf\xe9\n>From \xc4\xe3\n\n"));
        assert!(!content.windows(3).any(|w| w == "\u{FFFD}".as_bytes()));
    }

    #[test]
    fn it_should_append_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive.mbox");
        let raw = b"From: bob@localhost\r\nSubject: hi\r\n\r\nbody\r\n".to_vec();

        for _ in 0..2 {
            let mut mbox = MboxWriter::append(&path).unwrap();
            mbox.write(&Envelope::new(1, raw.clone())).unwrap();
            mbox.flush().unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(2, content.matches("\nSubject: hi\n").count());
        assert!(content.starts_with("From bob@localhost "));
    }
}
