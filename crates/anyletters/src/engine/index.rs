//! Length-partitioned membership index for guess validation.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::forms::ExpandedFormSet;
use super::language_meta::{transliterate, transliterations};
use crate::types::{LanguageCode, WordNormalizer, letter_count};

/// Outcome of checking one guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    /// The guess has the wrong number of letters; nothing was looked up.
    WrongLength { expected: usize, actual: usize },
    /// The guess is not a word of the dictionary.
    Unknown,
}

impl Verdict {
    pub fn is_valid(self) -> bool {
        self == Verdict::Valid
    }
}

/// Immutable set of valid words grouped by letter count.
///
/// Lookups are case-insensitive: both the indexed forms and the guesses are
/// NFC-composed and lowercased with the language's case rules.
#[derive(Debug, Clone, Default)]
pub struct ValidationIndex {
    language: LanguageCode,
    normalizer: WordNormalizer,
    by_length: HashMap<usize, HashSet<String>>,
    /// Longer forms a transliterated guess may match when only one length
    /// is indexed.
    spellings: HashSet<String>,
}

impl ValidationIndex {
    /// Index every form of an expanded set.
    pub fn from_forms(forms: &ExpandedFormSet, language: &LanguageCode) -> Self {
        let mut by_length: HashMap<usize, HashSet<String>> = HashMap::new();
        for length in forms.lengths() {
            by_length
                .entry(length)
                .or_default()
                .extend(forms.words_of_length(length).map(str::to_string));
        }
        Self {
            language: language.clone(),
            normalizer: WordNormalizer::new(language),
            by_length,
            spellings: HashSet::new(),
        }
    }

    /// Index only the forms of one length.
    ///
    /// For languages with alternative spellings the longer forms those
    /// spellings produce are kept aside, so `straße` still finds `strasse`.
    pub fn for_length(forms: &ExpandedFormSet, language: &LanguageCode, length: usize) -> Self {
        let words: HashSet<String> = forms.words_of_length(length).map(str::to_string).collect();
        let mut by_length = HashMap::new();
        if !words.is_empty() {
            by_length.insert(length, words);
        }
        Self {
            language: language.clone(),
            normalizer: WordNormalizer::new(language),
            by_length,
            spellings: spelled_forms(forms, language, length),
        }
    }

    /// Add extra words, such as the secret-word pool of a round.
    pub fn with_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            let word = self.normalizer.normalize(word.as_ref());
            if !word.is_empty() {
                self.by_length
                    .entry(letter_count(&word))
                    .or_default()
                    .insert(word);
            }
        }
        self
    }

    pub fn language(&self) -> &LanguageCode {
        &self.language
    }

    /// Check a guess against the words of `length` letters.
    ///
    /// The length is checked before the guess is normalized or looked up.
    /// For languages with alternative spellings (German `ä` → `ae`) a guess
    /// that is not found as typed is retried in its transliterated form.
    pub fn check(&self, word: &str, length: usize) -> Verdict {
        let actual = letter_count(word.trim());
        if actual != length {
            return Verdict::WrongLength {
                expected: length,
                actual,
            };
        }
        let normalized = self.normalizer.normalize(word);
        if self.contains_normalized(&normalized) {
            return Verdict::Valid;
        }
        if let Some(spelled) = transliterate(self.language.archetype(), &normalized)
            && (self.contains_normalized(&spelled) || self.spellings.contains(&spelled))
        {
            debug!(guess = %normalized, accepted = %spelled, "accepted transliterated guess");
            return Verdict::Valid;
        }
        Verdict::Unknown
    }

    pub fn is_valid(&self, word: &str, length: usize) -> bool {
        self.check(word, length).is_valid()
    }

    /// Every indexed word of `length` letters, in no particular order.
    pub fn all_of_length(&self, length: usize) -> impl Iterator<Item = &str> {
        self.by_length
            .get(&length)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    pub fn len_of(&self, length: usize) -> usize {
        self.by_length.get(&length).map_or(0, HashSet::len)
    }

    /// Lengths with at least one word, ascending.
    pub fn lengths(&self) -> Vec<usize> {
        let mut lengths: Vec<usize> = self
            .by_length
            .iter()
            .filter(|(_, words)| !words.is_empty())
            .map(|(length, _)| *length)
            .collect();
        lengths.sort_unstable();
        lengths
    }

    fn contains_normalized(&self, word: &str) -> bool {
        self.by_length
            .get(&letter_count(word))
            .is_some_and(|words| words.contains(word))
    }
}

/// Forms longer than `length` that a transliterated guess of `length`
/// letters can spell. Every rewritten letter adds at most one.
fn spelled_forms(forms: &ExpandedFormSet, language: &LanguageCode, length: usize) -> HashSet<String> {
    let Some(table) = transliterations(language.archetype()) else {
        return HashSet::new();
    };
    forms
        .lengths()
        .filter(|&letters| letters > length && letters <= length * 2)
        .flat_map(move |letters| forms.words_of_length(letters))
        .filter(|word| table.iter().any(|(_, to)| word.contains(to)))
        .map(str::to_string)
        .collect()
}
