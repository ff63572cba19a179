//! Mailbox module.
//!
//! This module contains everything related to mailboxes.

mod mbox;
pub use mbox::*;

mod mboxes;
pub use mboxes::*;
