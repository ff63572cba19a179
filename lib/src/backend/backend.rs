//! Backend module.
//!
//! This module exposes the backend trait, which protocol adapters
//! implement so that the mail store can drive them without knowing
//! which wire protocol sits underneath.

use std::result;

use thiserror::Error;

use crate::{account, mbox::Mboxes};

#[derive(Error, Debug)]
pub enum Error {
    #[cfg(feature = "imap-backend")]
    #[error(transparent)]
    ImapError(#[from] super::imap::Error),

    #[error(transparent)]
    Pop3Error(#[from] super::pop3::Error),

    #[error(transparent)]
    AccountError(#[from] account::AccountError),

    #[error("cannot use {0} backend: neither header-only nor full message fetch is implemented")]
    MissingFetchPrimitiveError(&'static str),
    #[error("cannot find message {0}: valid ids range from 1 to {1}")]
    NotFoundError(u32, u32),
    #[error("cannot use mail store: it has not been opened yet")]
    NotOpenError,
    #[error("cannot open mail store: it is already open")]
    AlreadyOpenError,
    #[error("cannot use mail store: it has been closed")]
    ClosedError,
    #[error("cannot {0}: not supported by the {1} backend")]
    UnsupportedError(&'static str, &'static str),
}

/// Coarse classification of backend errors.
///
/// Connect and auth errors only happen while opening a session and
/// are fatal to it. Protocol errors are any non-success reply during
/// an operation. None of them is retried by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connect,
    Auth,
    Protocol,
    NotFound,
    Closed,
    Contract,
    Unsupported,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            #[cfg(feature = "imap-backend")]
            Self::ImapError(err) => err.kind(),
            Self::Pop3Error(err) => err.kind(),
            Self::AccountError(err) => err.kind(),
            Self::MissingFetchPrimitiveError(_) | Self::AlreadyOpenError => ErrorKind::Contract,
            Self::NotFoundError(..) => ErrorKind::NotFound,
            Self::NotOpenError | Self::ClosedError => ErrorKind::Closed,
            Self::UnsupportedError(..) => ErrorKind::Unsupported,
        }
    }
}

pub type Result<T> = result::Result<T, Error>;

/// Kind of message retrieval a backend can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// Headers only, without the body.
    Header,
    /// The whole raw message.
    Full,
}

/// Low-level verbs every protocol adapter implements.
///
/// Ids are the 1-based sequence numbers of the current session. The
/// backend does not validate them, the mail store does.
pub trait Backend {
    /// Short protocol name, used in logs and errors.
    fn name(&self) -> &'static str;

    /// Connects and authenticates.
    fn open(&mut self) -> Result<()>;

    /// Releases the connection. When `commit` is false, pending
    /// deletion marks must be discarded instead of committed.
    fn close(&mut self, commit: bool) -> Result<()>;

    fn total_messages(&mut self) -> Result<u32>;

    fn supports(&self, kind: FetchKind) -> bool;

    fn fetch(&mut self, id: u32, kind: FetchKind) -> Result<Vec<u8>>;

    fn mark_deleted(&mut self, id: u32) -> Result<()>;

    fn unmark_deleted(&mut self, _id: u32) -> Result<()> {
        Err(Error::UnsupportedError("unmark a deleted message", self.name()))
    }

    fn unmark_all_deleted(&mut self) -> Result<()>;

    /// Commits pending deletion marks.
    fn flush(&mut self) -> Result<()>;

    fn list_mboxes(&mut self) -> Result<Mboxes> {
        Err(Error::UnsupportedError("list mailboxes", self.name()))
    }
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn close(&mut self, commit: bool) -> Result<()> {
        (**self).close(commit)
    }

    fn total_messages(&mut self) -> Result<u32> {
        (**self).total_messages()
    }

    fn supports(&self, kind: FetchKind) -> bool {
        (**self).supports(kind)
    }

    fn fetch(&mut self, id: u32, kind: FetchKind) -> Result<Vec<u8>> {
        (**self).fetch(id, kind)
    }

    fn mark_deleted(&mut self, id: u32) -> Result<()> {
        (**self).mark_deleted(id)
    }

    fn unmark_deleted(&mut self, id: u32) -> Result<()> {
        (**self).unmark_deleted(id)
    }

    fn unmark_all_deleted(&mut self) -> Result<()> {
        (**self).unmark_all_deleted()
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn list_mboxes(&mut self) -> Result<Mboxes> {
        (**self).list_mboxes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountError;

    #[test]
    fn it_should_tell_config_errors_from_auth_errors() {
        let kind = |err: AccountError| Error::from(err).kind();
        assert_eq!(ErrorKind::Contract, kind(AccountError::MissingHostError));
        assert_eq!(ErrorKind::Contract, kind(AccountError::MissingUserError));
        assert_eq!(
            ErrorKind::Contract,
            kind(AccountError::ParseProtocolError("smtp".into()))
        );
        assert_eq!(ErrorKind::Auth, kind(AccountError::MissingPasswdError));
        assert_eq!(ErrorKind::Auth, kind(AccountError::GetPasswdEmptyError));
    }
}
