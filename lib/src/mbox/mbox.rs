//! Mailbox module.
//!
//! This module contains the representation of a server mailbox, as
//! listed by the backends able to list them.

use serde::Serialize;
use std::fmt;

/// Represents the mailbox.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Mbox {
    /// Represents the mailbox hierarchy delimiter.
    pub delim: String,
    /// Represents the mailbox name.
    pub name: String,
    /// Represents the mailbox attributes, like `NoSelect`.
    pub attrs: Vec<String>,
}

impl Mbox {
    pub fn is_selectable(&self) -> bool {
        !self
            .attrs
            .iter()
            .any(|attr| attr.eq_ignore_ascii_case("noselect"))
    }
}

impl fmt::Display for Mbox {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.attrs.is_empty() {
            write!(f, " ({})", self.attrs.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_should_display_name_and_attrs() {
        let mut mbox = Mbox {
            delim: "/".into(),
            name: "Archive".into(),
            attrs: vec![],
        };
        assert_eq!("Archive", mbox.to_string());
        assert!(mbox.is_selectable());

        mbox.attrs = vec!["NoSelect".into(), "Marked".into()];
        assert_eq!("Archive (NoSelect, Marked)", mbox.to_string());
        assert!(!mbox.is_selectable());
    }
}
