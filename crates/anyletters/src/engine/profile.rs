//! Per-language filter profiles.
//!
//! Profiles live in `<profiles_root>/global.json` and
//! `<profiles_root>/<archetype>.json`. Both are optional; list fields of the
//! two files are concatenated, and the archetype's `filters` and
//! `restricted_flags` take precedence when present.

use std::collections::BTreeSet;
use std::fs::read_to_string;
use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use super::error::EngineError;
use super::filters::SolutionFilter;
use crate::types::{Flag, LanguageCode, WordNormalizer};

pub const GLOBAL_PROFILE: &str = "global";

/// Filter and expansion settings for one language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LanguageProfile {
    /// Secrets may not start with these.
    pub prefixes: Vec<String>,
    /// Secrets may not end with these.
    pub suffixes: Vec<String>,
    pub blacklist: Vec<String>,
    /// Word-list files, relative to the profile directory, whose lines
    /// join the blacklist.
    pub blacklist_files: Vec<String>,
    /// Flags restricted expansion may follow. Empty means all flags.
    pub restricted_flags: Vec<String>,
    /// Replaces the built-in filter heuristics.
    pub filters: Option<Vec<SolutionFilter>>,
}

impl LanguageProfile {
    /// Load and merge the global and archetype profiles for a language.
    ///
    /// Words from `blacklist_files` are read into `blacklist`; a listed file
    /// that does not exist is skipped with a warning.
    pub fn load(root: &Path, language: &LanguageCode) -> Result<Self, EngineError> {
        let normalizer = WordNormalizer::new(language);
        let global = Self::read(root, GLOBAL_PROFILE, &normalizer)?.unwrap_or_default();
        let profile = match Self::read(root, language.archetype(), &normalizer)? {
            Some(specific) => global.merge(specific),
            None => global,
        };
        Ok(profile)
    }

    /// Parse a profile from JSON text.
    pub fn from_json(path: &Path, text: &str) -> Result<Self, EngineError> {
        serde_json::from_str(text).map_err(|e| EngineError::InvalidProfile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Blacklisted words, deduplicated.
    pub fn blacklist_words(&self) -> BTreeSet<String> {
        self.blacklist.iter().cloned().collect()
    }

    /// The expansion allow-list, if the profile restricts flags.
    pub fn allowed_flags(&self) -> Option<BTreeSet<Flag>> {
        if self.restricted_flags.is_empty() {
            None
        } else {
            Some(self.restricted_flags.iter().map(String::as_str).map(Flag::from).collect())
        }
    }

    fn read(
        root: &Path,
        name: &str,
        normalizer: &WordNormalizer,
    ) -> Result<Option<Self>, EngineError> {
        let path = root.join(format!("{name}.json"));
        let text = match read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no filter profile");
                return Ok(None);
            }
            Err(e) => {
                return Err(EngineError::InvalidProfile {
                    path,
                    message: e.to_string(),
                });
            }
        };
        let mut profile = Self::from_json(&path, &text)?;
        profile.normalize(normalizer);
        profile.load_blacklist_files(root, normalizer);
        Ok(Some(profile))
    }

    fn normalize(&mut self, normalizer: &WordNormalizer) {
        for list in [&mut self.prefixes, &mut self.suffixes, &mut self.blacklist] {
            for word in list.iter_mut() {
                *word = normalizer.normalize(word);
            }
            list.retain(|word| !word.is_empty());
        }
    }

    fn load_blacklist_files(&mut self, root: &Path, normalizer: &WordNormalizer) {
        for file in &self.blacklist_files {
            let path = root.join(file);
            match read_to_string(&path) {
                Ok(text) => self.blacklist.extend(
                    text.lines()
                        .map(|line| normalizer.normalize(line))
                        .filter(|word| !word.is_empty()),
                ),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping blacklist file"),
            }
        }
    }

    fn merge(mut self, other: LanguageProfile) -> LanguageProfile {
        self.prefixes.extend(other.prefixes);
        self.suffixes.extend(other.suffixes);
        self.blacklist.extend(other.blacklist);
        self.blacklist_files.extend(other.blacklist_files);
        if !other.restricted_flags.is_empty() {
            self.restricted_flags = other.restricted_flags;
        }
        if other.filters.is_some() {
            self.filters = other.filters;
        }
        self
    }
}
