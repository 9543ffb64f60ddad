use std::fmt::{Display, Formatter, Result as FmtResult};

use icu_locale_core::LanguageIdentifier;
use serde::{Deserialize, Serialize};

/// A dictionary language code such as `en`, `de-at` or `pt_br`.
///
/// Codes are trimmed and lowercased on construction, so lookups are
/// case-insensitive. The directory a code resolves to keeps its own
/// spelling; see [`DictionaryCatalog`](crate::DictionaryCatalog).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The primary language subtag, used to pick filter profiles and
    /// language-specific behavior (`de-at` → `de`).
    pub fn archetype(&self) -> &str {
        self.0.split(['-', '_']).next().unwrap_or_default()
    }

    /// The ICU language identifier for case mapping.
    ///
    /// Codes that are not valid BCP-47 fall back to the root locale.
    pub fn langid(&self) -> LanguageIdentifier {
        self.0
            .replace('_', "-")
            .parse::<LanguageIdentifier>()
            .or_else(|_| self.archetype().parse::<LanguageIdentifier>())
            .unwrap_or(LanguageIdentifier::UNKNOWN)
    }

    /// A file-system safe form of the code for cache directories.
    pub fn path_component(&self) -> String {
        self.0
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}

impl From<&str> for LanguageCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for LanguageCode {
    fn from(code: String) -> Self {
        Self::new(code)
    }
}

impl Display for LanguageCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}
