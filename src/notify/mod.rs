//! Notify module.
//!
//! This module gathers everything the `mail2bot` notifier needs:
//! message filter, web hook, cursor state and polling loop.

pub mod cancel;
pub use cancel::*;

pub mod config;
pub use config::*;

pub mod filter;
pub use filter::*;

pub mod hook;
pub use hook::*;

pub mod state;

pub mod template;
pub use template::*;

pub mod watcher;
pub use watcher::*;
