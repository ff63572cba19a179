pub mod backend;
pub use backend::*;

pub mod stream;
pub use stream::*;

#[cfg(feature = "imap-backend")]
pub mod imap {
    pub mod imap_backend;
    pub use imap_backend::*;

    pub mod error;
    pub use error::*;
}

#[cfg(feature = "imap-backend")]
pub use self::imap::ImapBackend;

pub mod pop3 {
    pub mod pop3_backend;
    pub use pop3_backend::*;

    pub mod pop3_session;
    pub use pop3_session::*;

    pub mod error;
    pub use error::*;
}

pub use self::pop3::{Pop3Backend, Pop3Session};
