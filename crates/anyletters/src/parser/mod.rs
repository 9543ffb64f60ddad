//! Hunspell `.aff` and `.dic` parsers.
//!
//! The parsers are pure: they turn decoded text (or raw bytes, through the
//! `from_bytes` constructors) into an [`AffixGrammar`] and a [`StemTable`]
//! without touching the file system or logging.

mod affix;
mod condition;
mod encoding;
pub mod error;
mod stems;

pub use affix::{AffixGrammar, AffixKind, AffixRule, FlagType, Marker, parse_affix_grammar};
pub use condition::Condition;
pub use encoding::Encoding;
pub use error::ParseError;
pub use stems::{StemEntry, StemTable, StemWarning, parse_stem_table};
