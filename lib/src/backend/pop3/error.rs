use std::{io, result};
use thiserror::Error;

use crate::{account, backend::ErrorKind};

#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot get pop3 session: the backend is not open")]
    GetSessionError,

    #[error("cannot create tls connector")]
    CreateTlsConnectorError(#[source] native_tls::Error),
    #[error("cannot connect to pop3 server {1}:{2}")]
    ConnectPop3ServerError(#[source] io::Error, String, u16),
    #[error("cannot negotiate tls with pop3 server {0}: {1}")]
    TlsHandshakeError(String, String),
    #[error("cannot read pop3 server greeting: {0}")]
    GreetingError(String),
    #[error("cannot login to pop3 server as {0}: {1}")]
    LoginPop3ServerError(String, String),

    #[error("cannot send pop3 command {1}")]
    SendCmdError(#[source] io::Error, String),
    #[error("cannot read pop3 response to {1}")]
    ReadResponseError(#[source] io::Error, String),
    #[error("pop3 server rejected {0}: {1}")]
    NegativeResponseError(String, String),
    #[error("cannot parse pop3 stat response {0:?}")]
    ParseStatError(String),

    #[error(transparent)]
    AccountError(#[from] account::AccountError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CreateTlsConnectorError(_)
            | Self::ConnectPop3ServerError(..)
            | Self::TlsHandshakeError(..)
            | Self::GreetingError(_) => ErrorKind::Connect,
            Self::LoginPop3ServerError(..) => ErrorKind::Auth,
            Self::AccountError(err) => err.kind(),
            Self::GetSessionError => ErrorKind::Closed,
            _ => ErrorKind::Protocol,
        }
    }
}

pub type Result<T> = result::Result<T, Error>;
