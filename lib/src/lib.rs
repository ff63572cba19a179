//! Mail store abstraction over POP3 and IMAP.
//!
//! The [`store::MailStore`] wraps any [`backend::Backend`] and
//! provides ranged and date-bounded streaming fetches plus the
//! retention policies (keep the last N, delete before/after a date,
//! delete everything). Fetched messages are exposed as lazily decoded
//! [`msg::Envelope`]s.

pub mod account;
pub mod backend;
pub mod mbox;
pub mod msg;
pub mod process;
pub mod store;
