//! Mail store module.
//!
//! This module contains the protocol-agnostic mail store, its lazy
//! fetch iterators and the retention policies built on top of them.

mod mail_store;
pub use mail_store::*;

mod fetch;
pub use fetch::*;

mod retention;

#[cfg(test)]
pub(crate) mod memory_backend;
