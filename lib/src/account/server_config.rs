//! Server config module.
//!
//! This module contains the representation of the mail server
//! connection settings, as found in configuration files.

use log::debug;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, time::Duration};
use thiserror::Error;

use crate::{
    backend::{Backend, ErrorKind, Pop3Backend},
    process::{self, ProcessError},
};

#[cfg(feature = "imap-backend")]
use crate::backend::ImapBackend;

pub const DEFAULT_INBOX_FOLDER: &str = "INBOX";
pub const DEFAULT_TIMEOUT: u64 = 60;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("cannot get password: {0}")]
    GetPasswdError(#[source] ProcessError),
    #[error("cannot get password: password is empty")]
    GetPasswdEmptyError,
    #[error("cannot find mail server host")]
    MissingHostError,
    #[error("cannot find mail server user")]
    MissingUserError,
    #[error("cannot find mail server password nor password command")]
    MissingPasswdError,
    #[error("cannot parse protocol {0:?}: expected pop3 or imap")]
    ParseProtocolError(String),
    #[error("cannot use protocol {0}: support has not been compiled in")]
    UnsupportedProtocolError(Protocol),
}

impl AccountError {
    /// Only credential failures are auth errors, the others come from
    /// an incomplete or invalid config.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::GetPasswdError(_) | Self::GetPasswdEmptyError | Self::MissingPasswdError => {
                ErrorKind::Auth
            }
            Self::UnsupportedProtocolError(_) => ErrorKind::Unsupported,
            Self::MissingHostError | Self::MissingUserError | Self::ParseProtocolError(_) => {
                ErrorKind::Contract
            }
        }
    }
}

/// Represents the wire protocol spoken by the mail server.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Pop3,
    #[default]
    Imap,
}

impl Protocol {
    pub fn default_port(&self, ssl: bool) -> u16 {
        match (self, ssl) {
            (Self::Pop3, true) => 995,
            (Self::Pop3, false) => 110,
            (Self::Imap, true) => 993,
            (Self::Imap, false) => 143,
        }
    }
}

impl FromStr for Protocol {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pop3" | "pop" => Ok(Self::Pop3),
            "imap" => Ok(Self::Imap),
            _ => Err(AccountError::ParseProtocolError(s.to_owned())),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Pop3 => write!(f, "pop3"),
            Self::Imap => write!(f, "imap"),
        }
    }
}

/// Represents the connection settings of a mail server.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ServerConfig {
    /// Represents the wire protocol.
    pub proto: Protocol,
    /// Represents the server host.
    pub host: String,
    /// Overrides the default port of the protocol.
    pub port: Option<u16>,
    /// Represents the login.
    pub user: String,
    /// Represents the password in clear text.
    pub passwd: Option<String>,
    /// Represents the shell command printing the password.
    pub passwd_cmd: Option<String>,
    /// Connects using implicit TLS.
    pub ssl: bool,
    /// Upgrades a plain connection with STARTTLS (IMAP only).
    pub starttls: bool,
    /// Trusts any certificate.
    pub insecure: bool,
    /// Represents the socket I/O timeout in seconds.
    pub timeout: Option<u64>,
    /// Represents the mailbox to select (IMAP only).
    pub mailbox: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            proto: Protocol::default(),
            host: String::default(),
            port: None,
            user: String::default(),
            passwd: None,
            passwd_cmd: None,
            ssl: true,
            starttls: false,
            insecure: false,
            timeout: None,
            mailbox: None,
        }
    }
}

// The password never shows up in logs.
impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("proto", &self.proto)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("passwd", &self.passwd.as_ref().map(|_| "********"))
            .field("passwd_cmd", &self.passwd_cmd)
            .field("ssl", &self.ssl)
            .field("starttls", &self.starttls)
            .field("insecure", &self.insecure)
            .field("timeout", &self.timeout)
            .field("mailbox", &self.mailbox)
            .finish()
    }
}

impl ServerConfig {
    pub fn port(&self) -> u16 {
        self.port
            .unwrap_or_else(|| self.proto.default_port(self.ssl))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn mailbox(&self) -> &str {
        self.mailbox
            .as_deref()
            .filter(|mbox| !mbox.trim().is_empty())
            .unwrap_or(DEFAULT_INBOX_FOLDER)
    }

    /// Gets the password, either directly or from the output of the
    /// password command.
    pub fn passwd(&self) -> Result<String, AccountError> {
        if let Some(passwd) = self.passwd.as_ref() {
            return Ok(passwd.to_owned());
        }

        let cmd = self
            .passwd_cmd
            .as_deref()
            .ok_or(AccountError::MissingPasswdError)?;
        let passwd = process::run(cmd).map_err(AccountError::GetPasswdError)?;
        let passwd = passwd.lines().next().unwrap_or_default().trim().to_owned();
        if passwd.is_empty() {
            return Err(AccountError::GetPasswdEmptyError);
        }
        Ok(passwd)
    }

    /// Checks that the settings required to connect are present.
    pub fn validate(&self) -> Result<(), AccountError> {
        if self.host.trim().is_empty() {
            return Err(AccountError::MissingHostError);
        }
        if self.user.trim().is_empty() {
            return Err(AccountError::MissingUserError);
        }
        if self.passwd.is_none() && self.passwd_cmd.is_none() {
            return Err(AccountError::MissingPasswdError);
        }
        Ok(())
    }

    /// Builds the unopened backend matching the protocol.
    pub fn to_backend(&self) -> Result<Box<dyn Backend>, AccountError> {
        debug!("build {} backend for {}@{}", self.proto, self.user, self.host);
        match self.proto {
            Protocol::Pop3 => Ok(Box::new(Pop3Backend::new(self.clone()))),
            #[cfg(feature = "imap-backend")]
            Protocol::Imap => Ok(Box::new(ImapBackend::new(self.clone()))),
            #[cfg(not(feature = "imap-backend"))]
            Protocol::Imap => Err(AccountError::UnsupportedProtocolError(self.proto)),
        }
    }
}
