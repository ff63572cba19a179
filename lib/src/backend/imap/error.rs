use std::result;
use thiserror::Error;

use crate::{account, backend::ErrorKind};

#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot get imap session: the backend is not open")]
    GetSessionError,
    #[error("cannot find message {0}")]
    FindMsgError(u32),
    #[error("cannot get {1} of message {0}")]
    GetMsgPayloadError(u32, &'static str),

    #[error("cannot create tls connector")]
    CreateTlsConnectorError(#[source] native_tls::Error),
    #[error("cannot connect to imap server {1}:{2}")]
    ConnectImapServerError(#[source] imap::Error, String, u16),
    #[error("cannot login to imap server as {1}")]
    LoginImapServerError(#[source] imap::Error, String),
    #[error("cannot select mailbox {1}")]
    SelectMboxError(#[source] imap::Error, String),
    #[error("cannot list mailboxes")]
    ListMboxesError(#[source] imap::Error),
    #[error("cannot fetch message {1}")]
    FetchMsgError(#[source] imap::Error, u32),
    #[error("cannot add deleted flag to message {1}")]
    AddDeletedFlagError(#[source] imap::Error, String),
    #[error("cannot remove deleted flag from message(s) {1}")]
    DelDeletedFlagError(#[source] imap::Error, String),
    #[error("cannot expunge mailbox {1}")]
    ExpungeError(#[source] imap::Error, String),
    #[error("cannot close mailbox {1}")]
    CloseMboxError(#[source] imap::Error, String),
    #[error("cannot logout from imap server")]
    LogoutError(#[source] imap::Error),

    #[error(transparent)]
    AccountError(#[from] account::AccountError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CreateTlsConnectorError(_) | Self::ConnectImapServerError(..) => {
                ErrorKind::Connect
            }
            Self::LoginImapServerError(..) => ErrorKind::Auth,
            Self::AccountError(err) => err.kind(),
            Self::GetSessionError => ErrorKind::Closed,
            Self::FindMsgError(_) => ErrorKind::NotFound,
            _ => ErrorKind::Protocol,
        }
    }
}

pub type Result<T> = result::Result<T, Error>;
