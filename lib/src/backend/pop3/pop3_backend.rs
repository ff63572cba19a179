//! POP3 backend module.
//!
//! This module contains the definition of the POP3 backend. POP3 has
//! no mailbox concept and renumbers messages on every session.
//! Deletions are only staged by `DELE`: the server commits them when
//! the session ends with `QUIT`, unless `RSET` was issued before.

use log::{debug, info, trace};

use crate::{
    account::ServerConfig,
    backend::{
        self,
        pop3::{Error, Pop3Session},
        Backend, FetchKind,
    },
};

pub struct Pop3Backend {
    config: ServerConfig,
    sess: Option<Pop3Session>,
}

impl Pop3Backend {
    pub fn new(config: ServerConfig) -> Self {
        Self { config, sess: None }
    }

    fn sess(&mut self) -> Result<&mut Pop3Session, Error> {
        self.sess.as_mut().ok_or(Error::GetSessionError)
    }

    /// Returns the total size of the mailbox in octets.
    pub fn total_size(&mut self) -> backend::Result<u64> {
        Ok(self.sess()?.stat()?.size)
    }

    fn quit(&mut self, commit: bool) -> Result<(), Error> {
        if let Some(mut sess) = self.sess.take() {
            if !commit {
                debug!("reset deletion marks before quitting");
                sess.rset()?;
            }
            debug!("quit pop3 session");
            sess.quit()?;
        } else {
            debug!("no session found");
        }
        Ok(())
    }
}

impl Backend for Pop3Backend {
    fn name(&self) -> &'static str {
        "pop3"
    }

    fn open(&mut self) -> backend::Result<()> {
        trace!(">> pop3 open");

        let mut sess = Pop3Session::connect(
            &self.config.host,
            self.config.port(),
            self.config.ssl,
            self.config.insecure,
            self.config.timeout(),
        )?;
        let passwd = self.config.passwd().map_err(Error::AccountError)?;
        sess.login(&self.config.user, &passwd)?;
        self.sess = Some(sess);

        trace!("<< pop3 open");
        Ok(())
    }

    fn close(&mut self, commit: bool) -> backend::Result<()> {
        Ok(self.quit(commit)?)
    }

    fn total_messages(&mut self) -> backend::Result<u32> {
        Ok(self.sess()?.stat()?.count)
    }

    fn supports(&self, _kind: FetchKind) -> bool {
        true
    }

    fn fetch(&mut self, id: u32, kind: FetchKind) -> backend::Result<Vec<u8>> {
        let sess = self.sess()?;
        let raw = match kind {
            FetchKind::Header => sess.top(id, 0)?,
            FetchKind::Full => sess.retr(id)?,
        };
        debug!("fetch message {}, {} octets", id, raw.len());
        Ok(raw)
    }

    fn mark_deleted(&mut self, id: u32) -> backend::Result<()> {
        Ok(self.sess()?.dele(id)?)
    }

    fn unmark_all_deleted(&mut self) -> backend::Result<()> {
        Ok(self.sess()?.rset()?)
    }

    /// Commits the staged deletions by ending the session, then
    /// reconnects so the backend stays usable.
    fn flush(&mut self) -> backend::Result<()> {
        self.quit(true)?;
        info!("pop3 session closed to commit deletions, reconnecting");
        self.open()
    }
}
