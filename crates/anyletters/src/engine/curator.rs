//! Secret-word pool resolution.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::fs::read_to_string;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::error::EngineError;
use super::filters::FilterSet;
use super::forms::ExpandedFormSet;
use crate::types::{LanguageCode, WordNormalizer, letter_count};

/// Where a solution pool came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SolutionSource {
    /// A curated word list supplied by the user.
    UserFile { path: PathBuf },
    /// A pool curated by an earlier run.
    Cache,
    /// Forms of the dictionary, optionally filtered.
    Dictionary { filtered: bool },
}

impl Display for SolutionSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SolutionSource::UserFile { path } => write!(f, "solutions file {}", path.display()),
            SolutionSource::Cache => f.write_str("cache"),
            SolutionSource::Dictionary { filtered: true } => f.write_str("filtered dictionary"),
            SolutionSource::Dictionary { filtered: false } => f.write_str("dictionary"),
        }
    }
}

/// The candidate secrets for one language and length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionPool {
    language: LanguageCode,
    length: usize,
    words: BTreeSet<String>,
    source: SolutionSource,
}

impl SolutionPool {
    pub fn new(
        language: LanguageCode,
        length: usize,
        words: BTreeSet<String>,
        source: SolutionSource,
    ) -> Self {
        Self {
            language,
            length,
            words,
            source,
        }
    }

    pub fn language(&self) -> &LanguageCode {
        &self.language
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn source(&self) -> &SolutionSource {
        &self.source
    }

    /// Words in lexical order.
    pub fn words(&self) -> &BTreeSet<String> {
        &self.words
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn into_words(self) -> BTreeSet<String> {
        self.words
    }
}

/// Builds solution pools from user files and expanded forms.
///
/// The engine drives the ordered resolution (user file, then cache, then
/// dictionary); the curator implements the two steps that produce words.
pub struct SolutionCurator<'a> {
    language: &'a LanguageCode,
    filters: &'a FilterSet,
    normalizer: WordNormalizer,
}

impl<'a> SolutionCurator<'a> {
    pub fn new(language: &'a LanguageCode, filters: &'a FilterSet) -> Self {
        Self {
            language,
            filters,
            normalizer: WordNormalizer::new(language),
        }
    }

    /// Path of the user solutions file for a language and length.
    pub fn user_file_path(root: &Path, language: &LanguageCode, length: usize) -> PathBuf {
        root.join(format!("{language}{length}.txt"))
    }

    /// Read a user solutions file.
    ///
    /// Returns `Ok(None)` when the file does not exist. Words of another
    /// length are dropped with a warning; an existing file that yields no
    /// words is `NoSolutionsAvailable`.
    pub fn read_user_file(&self, path: &Path, length: usize) -> Result<Option<SolutionPool>, EngineError> {
        let text = match read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(EngineError::SolutionsUnreadable {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let source = SolutionSource::UserFile {
            path: path.to_path_buf(),
        };
        let mut words = BTreeSet::new();
        for word in text.lines().map(|line| self.normalizer.normalize(line)) {
            if word.is_empty() {
                continue;
            }
            let letters = letter_count(&word);
            if letters == length {
                words.insert(word);
            } else {
                warn!(path = %path.display(), %word, letters, length, "dropping solution of wrong length");
            }
        }
        if words.is_empty() {
            return Err(EngineError::NoSolutionsAvailable {
                language: self.language.to_string(),
                length,
                origin: source,
            });
        }
        Ok(Some(SolutionPool::new(self.language.clone(), length, words, source)))
    }

    /// Curate the forms of `length` letters through the filter set.
    pub fn curate(&self, forms: &ExpandedFormSet, length: usize) -> Result<SolutionPool, EngineError> {
        if forms.count_of_length(length) == 0 {
            return Err(EngineError::NoFormsOfLength {
                language: self.language.to_string(),
                length,
            });
        }
        let words = self.filters.apply(forms, length);
        let source = SolutionSource::Dictionary {
            filtered: !self.filters.is_empty(),
        };
        if words.is_empty() {
            return Err(EngineError::NoSolutionsAvailable {
                language: self.language.to_string(),
                length,
                origin: source,
            });
        }
        Ok(SolutionPool::new(self.language.clone(), length, words, source))
    }
}
