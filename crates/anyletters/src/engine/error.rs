//! Error types for dictionary loading, curation and caching.

use std::io::Error as IoError;
use std::path::PathBuf;

use strsim::levenshtein;
use thiserror::Error;

use super::curator::SolutionSource;
use crate::parser::ParseError;

/// Errors that occur while locating, reading or parsing a dictionary.
#[derive(Debug, Error)]
pub enum LoadError {
    /// No language directory matches the requested code.
    #[error("no dictionary for language '{language}'{}", suggestion_hint(suggestions))]
    NotFound {
        language: String,
        suggestions: Vec<String>,
    },

    /// File I/O error when reading a dictionary file.
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: IoError,
    },

    /// A dictionary file that does not parse.
    #[error("{path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

/// Errors surfaced to the game controller.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The dictionary directory itself cannot be listed.
    #[error("dictionary directory unavailable: {source}")]
    CatalogUnavailable {
        #[source]
        source: LoadError,
    },

    /// The language's dictionary is missing or does not parse.
    #[error("dictionary unavailable for '{language}': {source}")]
    DictionaryUnavailable {
        language: String,
        #[source]
        source: LoadError,
    },

    /// The dictionary has no word of the requested length.
    #[error("no {length}-letter words in the '{language}' dictionary")]
    NoFormsOfLength { language: String, length: usize },

    /// Curation left no candidate secrets.
    #[error("no {length}-letter solutions for '{language}' ({origin})")]
    NoSolutionsAvailable {
        language: String,
        length: usize,
        origin: SolutionSource,
    },

    /// A solutions file exists but cannot be read.
    #[error("failed to read solutions file '{path}': {source}")]
    SolutionsUnreadable {
        path: PathBuf,
        #[source]
        source: IoError,
    },

    /// A filter profile that cannot be read or decoded.
    #[error("invalid filter profile '{path}': {message}")]
    InvalidProfile { path: PathBuf, message: String },
}

/// Errors from the persistent cache.
///
/// Read paths recover from these by recomputing; only explicit cache
/// management (`store`, `clear`) returns them.
#[derive(Debug, Error)]
pub enum CacheError {
    /// A record exists but cannot be decoded.
    #[error("corrupt cache record '{path}': {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("cache I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: IoError,
    },

    #[error("failed to encode cache record: {source}")]
    Encode {
        #[from]
        source: serde_json::Error,
    },
}

/// Compute typo suggestions using Levenshtein distance.
///
/// - distance <= 1 for names of up to 3 chars
/// - distance <= 2 for longer names
/// - at most 3 suggestions, closest first
pub fn compute_suggestions<'a>(name: &str, available: impl Iterator<Item = &'a str>) -> Vec<String> {
    let max_distance = if name.len() <= 3 { 1 } else { 2 };
    let mut suggestions: Vec<(usize, String)> = available
        .filter_map(|candidate| {
            let dist = levenshtein(name, candidate);
            if dist <= max_distance && dist > 0 {
                Some((dist, candidate.to_string()))
            } else {
                None
            }
        })
        .collect();

    suggestions.sort_by_key(|(dist, _)| *dist);
    suggestions.into_iter().take(3).map(|(_, s)| s).collect()
}

fn suggestion_hint(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(", did you mean: {}?", suggestions.join(", "))
    }
}
