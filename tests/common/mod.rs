use std::{cell::RefCell, collections::BTreeSet, rc::Rc};

use mailaid_lib::backend::{Backend, Error, FetchKind, Result};

pub fn message(from: &str, subject: &str, date: &str, body: &str) -> Vec<u8> {
    format!(
        "From: {}\r\nSubject: {}\r\nDate: {}\r\nContent-Type: text/plain\r\n\r\n{}\r\n",
        from, subject, date, body
    )
    .into_bytes()
}

/// Mailbox shared between the test and the backends it hands out.
#[derive(Clone, Default)]
pub struct Mailbox {
    pub messages: Rc<RefCell<Vec<Vec<u8>>>>,
}

#[allow(dead_code)]
impl Mailbox {
    pub fn push(&self, raw: Vec<u8>) {
        self.messages.borrow_mut().push(raw);
    }

    pub fn len(&self) -> usize {
        self.messages.borrow().len()
    }

    pub fn backend(&self) -> SharedBackend {
        SharedBackend {
            mailbox: self.clone(),
            deleted: BTreeSet::new(),
            open: false,
        }
    }
}

pub struct SharedBackend {
    mailbox: Mailbox,
    deleted: BTreeSet<u32>,
    open: bool,
}

impl SharedBackend {
    fn check_open(&self) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(Error::NotOpenError)
        }
    }

    fn expunge(&mut self) {
        let deleted = std::mem::take(&mut self.deleted);
        let mut id = 0;
        self.mailbox.messages.borrow_mut().retain(|_| {
            id += 1;
            !deleted.contains(&id)
        });
    }
}

impl Backend for SharedBackend {
    fn name(&self) -> &'static str {
        "shared"
    }

    fn open(&mut self) -> Result<()> {
        self.open = true;
        Ok(())
    }

    fn close(&mut self, commit: bool) -> Result<()> {
        if commit {
            self.expunge();
        }
        self.deleted.clear();
        self.open = false;
        Ok(())
    }

    fn total_messages(&mut self) -> Result<u32> {
        self.check_open()?;
        Ok(self.mailbox.len() as u32)
    }

    fn supports(&self, _kind: FetchKind) -> bool {
        true
    }

    fn fetch(&mut self, id: u32, kind: FetchKind) -> Result<Vec<u8>> {
        self.check_open()?;
        let raw = self.mailbox.messages.borrow()[id as usize - 1].clone();
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
        Ok(())
    }

    fn unmark_all_deleted(&mut self) -> Result<()> {
        self.deleted.clear();
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.check_open()?;
        self.expunge();
        Ok(())
    }
}
