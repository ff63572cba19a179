//! Holiday module.
//!
//! This module tells working days from days off, country by country,
//! and gates the notifier to work hours.

pub mod book;
pub use book::*;

pub mod calendar;
pub use calendar::*;

pub mod china;
pub use china::*;

pub mod nager;
pub use nager::*;

pub mod config;
pub use config::*;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::time::Duration;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .build()
        .context("cannot build holiday http client")
}
