//! Mail retention and notification tools.
//!
//! This crate holds the pieces shared by the `mailaid` command-line
//! tool and the `mail2bot` notifier: configuration, output, holiday
//! gate and notifier loop.

pub mod cli;
pub mod config;
pub mod holiday;
pub mod mbox;
pub mod msg;
pub mod notify;
pub mod output;
pub mod printer;
