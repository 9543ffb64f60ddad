use icu_casemap::CaseMapper;
use icu_locale_core::LanguageIdentifier;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

use super::LanguageCode;

/// Brings words into the canonical form used by every index and pool:
/// trimmed, NFC-composed and lowercased with the language's case rules.
#[derive(Debug, Clone)]
pub struct WordNormalizer {
    langid: LanguageIdentifier,
}

impl Default for WordNormalizer {
    fn default() -> Self {
        Self {
            langid: LanguageIdentifier::UNKNOWN,
        }
    }
}

impl WordNormalizer {
    pub fn new(language: &LanguageCode) -> Self {
        Self {
            langid: language.langid(),
        }
    }

    pub fn normalize(&self, word: &str) -> String {
        let composed: String = word.trim().nfc().collect();
        CaseMapper::new()
            .lowercase_to_string(&composed, &self.langid)
            .to_string()
    }
}

/// Number of user-perceived letters (extended grapheme clusters) in `word`.
///
/// ```
/// use anyletters::letter_count;
///
/// assert_eq!(letter_count("baking"), 6);
/// assert_eq!(letter_count("grüße"), 5);
/// ```
pub fn letter_count(word: &str) -> usize {
    word.graphemes(true).count()
}

/// Whether the word starts with an uppercase letter.
pub fn looks_capitalized(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}
