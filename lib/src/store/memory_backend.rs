//! In-memory backend used by the store tests.

use std::collections::BTreeSet;

use crate::backend::{Backend, Error, FetchKind, Result};

pub fn msg(subject: &str, date: Option<&str>) -> Vec<u8> {
    let mut raw = format!("From: Alice <alice@example.com>\r\nSubject: {}\r\n", subject);
    if let Some(date) = date {
        raw.push_str(&format!("Date: {}\r\n", date));
    }
    raw.push_str("\r\nbody\r\n");
    raw.into_bytes()
}

pub struct MemoryBackend {
    pub messages: Vec<Vec<u8>>,
    pub deleted: BTreeSet<u32>,
    pub marks: Vec<u32>,
    pub fetched: Vec<(u32, FetchKind)>,
    pub flushes: usize,
    pub closed_with: Option<bool>,
    header: bool,
    full: bool,
    open: bool,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            deleted: BTreeSet::new(),
            marks: Vec::new(),
            fetched: Vec::new(),
            flushes: 0,
            closed_with: None,
            header: true,
            full: true,
            open: false,
        }
    }
}

impl MemoryBackend {
    pub fn with_messages<I: IntoIterator<Item = Vec<u8>>>(messages: I) -> Self {
        Self {
            messages: messages.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn supporting(self, header: bool, full: bool) -> Self {
        Self {
            header,
            full,
            ..self
        }
    }

    fn expunge(&mut self) {
        let deleted = std::mem::take(&mut self.deleted);
        let mut id = 0;
        self.messages.retain(|_| {
            id += 1;
            !deleted.contains(&id)
        });
    }

    fn check_open(&self) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(Error::NotOpenError)
        }
    }
}

impl Backend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn open(&mut self) -> Result<()> {
        self.open = true;
        Ok(())
    }

    fn close(&mut self, commit: bool) -> Result<()> {
        if commit {
            self.expunge();
        } else {
            self.deleted.clear();
        }
        self.closed_with = Some(commit);
        self.open = false;
        Ok(())
    }

    fn total_messages(&mut self) -> Result<u32> {
        self.check_open()?;
        Ok(self.messages.len() as u32)
    }

    fn supports(&self, kind: FetchKind) -> bool {
        match kind {
            FetchKind::Header => self.header,
            FetchKind::Full => self.full,
        }
    }

    fn fetch(&mut self, id: u32, kind: FetchKind) -> Result<Vec<u8>> {
        self.check_open()?;
        self.fetched.push((id, kind));
        let raw = self.messages[id as usize - 1].clone();
        match kind {
            FetchKind::Full => Ok(raw),
            FetchKind::Header => {
                let end = raw
                    .windows(4)
                    .position(|w| w == b"\r\n\r\n")
                    .map(|pos| pos + 4)
                    .unwrap_or(raw.len());
                Ok(raw[..end].to_vec())
            }
        }
    }

    fn mark_deleted(&mut self, id: u32) -> Result<()> {
        self.check_open()?;
        self.deleted.insert(id);
        self.marks.push(id);
        Ok(())
    }

    fn unmark_deleted(&mut self, id: u32) -> Result<()> {
        self.check_open()?;
        self.deleted.remove(&id);
        Ok(())
    }

    fn unmark_all_deleted(&mut self) -> Result<()> {
        self.check_open()?;
        self.deleted.clear();
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.check_open()?;
        self.expunge();
        self.flushes += 1;
        Ok(())
    }
}
