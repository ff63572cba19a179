pub mod command;

pub mod envelopes;
pub use envelopes::*;

pub mod mbox_file;
