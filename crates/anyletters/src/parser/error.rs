//! Parse error types for Hunspell files.

use thiserror::Error;

use crate::types::Flag;

/// An error that occurred while parsing an `.aff` or `.dic` file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A malformed line.
    #[error("syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// An affix block header declared a different number of rules than
    /// the block contains.
    #[error(
        "affix block '{flag}' at line {line} declares {declared} rules but has {found}"
    )]
    RuleCountMismatch {
        line: usize,
        flag: Flag,
        declared: usize,
        found: usize,
    },

    /// A flag field that does not fit the grammar's flag representation.
    #[error("invalid flags '{flags}' at line {line}: {message}")]
    InvalidFlags {
        line: usize,
        flags: String,
        message: String,
    },

    /// A `SET` directive naming an encoding we cannot decode.
    #[error("unsupported encoding '{name}'")]
    UnsupportedEncoding { name: String },

    /// Bytes that do not decode in the declared encoding.
    #[error("input is not valid {encoding}")]
    InvalidEncoding { encoding: &'static str },
}

impl ParseError {
    /// The 1-based line the error points at, when it has one.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::Syntax { line, .. }
            | ParseError::RuleCountMismatch { line, .. }
            | ParseError::InvalidFlags { line, .. } => Some(*line),
            ParseError::UnsupportedEncoding { .. } | ParseError::InvalidEncoding { .. } => None,
        }
    }
}
