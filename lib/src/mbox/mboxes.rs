use serde::Serialize;
use std::{fmt, ops::Deref};

use super::Mbox;

/// Represents the list of mailboxes.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Mboxes {
    #[serde(rename = "mailboxes")]
    pub mboxes: Vec<Mbox>,
}

impl Deref for Mboxes {
    type Target = Vec<Mbox>;

    fn deref(&self) -> &Self::Target {
        &self.mboxes
    }
}

impl FromIterator<Mbox> for Mboxes {
    fn from_iter<T: IntoIterator<Item = Mbox>>(iter: T) -> Self {
        Self {
            mboxes: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Mboxes {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for mbox in &self.mboxes {
            writeln!(f, "{}", mbox)?;
        }
        Ok(())
    }
}
