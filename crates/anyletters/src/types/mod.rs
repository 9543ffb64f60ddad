mod difficulty;
mod fingerprint;
mod flag;
mod language;
mod word;

pub use difficulty::{Difficulty, DifficultyParseError, ExpansionMode, RevealPolicy};
pub use fingerprint::Fingerprint;
pub use flag::Flag;
pub use language::LanguageCode;
pub use word::{WordNormalizer, letter_count, looks_capitalized};
