use std::fmt::{Display, Formatter, Result as FmtResult};
use std::ops::Deref;

use serde::{Deserialize, Serialize};

/// An affix or marker flag as written in a `.aff` or `.dic` file.
///
/// Depending on the grammar's `FLAG` directive a flag is a single
/// character, a two-character pair, or a decimal number. The flag keeps its
/// textual form so that all three representations compare the same way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Flag(String);

impl Flag {
    /// Create a new flag from any string-like value.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the flag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Flag {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<&str> for Flag {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Flag {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<char> for Flag {
    fn from(c: char) -> Self {
        Self(c.to_string())
    }
}

impl Display for Flag {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}
