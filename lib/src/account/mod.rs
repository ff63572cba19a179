//! Account module.
//!
//! This module contains the connection settings of a mail account.

mod server_config;
pub use server_config::*;
