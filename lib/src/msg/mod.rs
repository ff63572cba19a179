//! Message module.
//!
//! This module contains the decoded view of a raw message as fetched
//! from a backend.

mod header;
pub use header::*;

mod addr;
pub use addr::*;

mod envelope;
pub use envelope::*;
