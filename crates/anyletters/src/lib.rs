//! Hunspell dictionary engine for AnyLetters, a variable-length
//! word-guessing game.
//!
//! Dictionaries are `.aff`/`.dic` pairs. The [`parser`] module reads them
//! into an [`AffixGrammar`](parser::AffixGrammar) and a
//! [`StemTable`](parser::StemTable); the [`engine`] expands stems into every
//! surface form, validates guesses, curates secret words and caches the
//! results on disk.

pub mod engine;
pub mod parser;
pub mod types;

pub use engine::{
    CacheError, CacheScope, CacheStore, Dictionary, DictionaryCatalog, Engine, EngineError,
    ExpandedFormSet, ExpansionConfig, FilterSet, Filtering, FormExpander, FormInfo, LoadError,
    Round, RoundRequest, SolutionFilter, SolutionPool, SolutionSource, ValidationIndex, Verdict,
};
pub use parser::ParseError;
pub use types::{
    Difficulty, ExpansionMode, Fingerprint, Flag, LanguageCode, RevealPolicy, WordNormalizer,
    letter_count,
};
