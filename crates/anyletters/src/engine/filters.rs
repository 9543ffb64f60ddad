//! Solution filters: which dictionary forms make fair secret words.

use std::collections::BTreeSet;

use rustrict::CensorStr;
use serde::{Deserialize, Serialize};

use super::forms::{ExpandedFormSet, FormInfo};
use super::language_meta::capitalizes_common_nouns;
use super::profile::LanguageProfile;
use crate::types::{Fingerprint, LanguageCode};

/// Roots shorter than this rarely make recognizable affixed secrets.
pub const DEFAULT_MIN_ROOT_LEN: usize = 3;

/// One rule that removes forms from the secret-word pool.
///
/// Profiles list filters as JSON objects tagged by `kind`:
///
/// ```
/// use anyletters::SolutionFilter;
///
/// let filter: SolutionFilter =
///     serde_json::from_str(r#"{ "kind": "short_roots", "min": 4 }"#).unwrap();
/// assert_eq!(filter, SolutionFilter::ShortRoots { min: 4 });
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SolutionFilter {
    /// Forms containing anything other than letters.
    NonAlphabetic,
    /// Profane or offensive words.
    Profanity,
    /// Forms derived only from capitalized stems.
    ProperNouns,
    /// Forms that only exist with an affix.
    AffixedForms,
    /// Affixed forms whose stem is shorter than `min` letters.
    ShortRoots { min: usize },
    /// Specific words.
    Blacklist { words: BTreeSet<String> },
    /// Forms starting with any of these strings.
    ExcludedPrefixes { prefixes: Vec<String> },
    /// Forms ending with any of these strings.
    ExcludedSuffixes { suffixes: Vec<String> },
}

impl SolutionFilter {
    pub fn rejects(&self, word: &str, info: FormInfo) -> bool {
        match self {
            SolutionFilter::NonAlphabetic => !word.chars().all(char::is_alphabetic),
            SolutionFilter::Profanity => word.is_inappropriate(),
            SolutionFilter::ProperNouns => info.proper,
            SolutionFilter::AffixedForms => info.affixed,
            SolutionFilter::ShortRoots { min } => info.affixed && info.root_len < *min,
            SolutionFilter::Blacklist { words } => words.contains(word),
            SolutionFilter::ExcludedPrefixes { prefixes } => {
                prefixes.iter().any(|prefix| word.starts_with(prefix.as_str()))
            }
            SolutionFilter::ExcludedSuffixes { suffixes } => {
                suffixes.iter().any(|suffix| word.ends_with(suffix.as_str()))
            }
        }
    }
}

/// Whether a solution request applies the language's filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Filtering {
    #[default]
    Enabled,
    Disabled,
}

/// An ordered list of filters applied to candidate secrets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSet {
    filters: Vec<SolutionFilter>,
}

impl FilterSet {
    pub fn new(filters: Vec<SolutionFilter>) -> Self {
        Self { filters }
    }

    /// No filtering: every form is a candidate.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// The filters for a language.
    ///
    /// A profile with an explicit `filters` list replaces the built-in
    /// heuristics (non-letters, profanity, proper nouns where capitalization identifies
    /// them, short affixed roots). Profile blacklists and excluded
    /// prefixes/suffixes are always appended.
    pub fn for_language(language: &LanguageCode, profile: &LanguageProfile) -> Self {
        let mut filters = match &profile.filters {
            Some(filters) => filters.clone(),
            None => {
                let mut defaults = vec![SolutionFilter::NonAlphabetic, SolutionFilter::Profanity];
                if !capitalizes_common_nouns(language.archetype()) {
                    defaults.push(SolutionFilter::ProperNouns);
                }
                defaults.push(SolutionFilter::ShortRoots {
                    min: DEFAULT_MIN_ROOT_LEN,
                });
                defaults
            }
        };
        let blacklist = profile.blacklist_words();
        if !blacklist.is_empty() {
            filters.push(SolutionFilter::Blacklist { words: blacklist });
        }
        if !profile.prefixes.is_empty() {
            filters.push(SolutionFilter::ExcludedPrefixes {
                prefixes: profile.prefixes.clone(),
            });
        }
        if !profile.suffixes.is_empty() {
            filters.push(SolutionFilter::ExcludedSuffixes {
                suffixes: profile.suffixes.clone(),
            });
        }
        Self { filters }
    }

    pub fn filters(&self) -> &[SolutionFilter] {
        &self.filters
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn accepts(&self, word: &str, info: FormInfo) -> bool {
        !self.filters.iter().any(|filter| filter.rejects(word, info))
    }

    /// The forms of `length` letters that pass every filter.
    pub fn apply(&self, forms: &ExpandedFormSet, length: usize) -> BTreeSet<String> {
        forms
            .forms_of_length(length)
            .filter(|(word, info)| self.accepts(word, *info))
            .map(|(word, _)| word.to_string())
            .collect()
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of_str(&format!("{:?}", self.filters))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: FormInfo = FormInfo {
        affixed: false,
        proper: false,
        root_len: 4,
    };

    #[test]
    fn profanity_filter_rejects_offensive_words() {
        assert!(SolutionFilter::Profanity.rejects("fuck", PLAIN));
        assert!(!SolutionFilter::Profanity.rejects("house", PLAIN));
    }

    #[test]
    fn default_filters_include_profanity() {
        let filters = FilterSet::for_language(&LanguageCode::new("en"), &LanguageProfile::default());

        assert!(filters.filters().contains(&SolutionFilter::Profanity));
        assert!(!filters.accepts("shit", PLAIN));
        assert!(filters.accepts("tree", PLAIN));
    }

    #[test]
    fn profile_filters_can_leave_profanity_out() {
        let profile = LanguageProfile {
            filters: Some(vec![SolutionFilter::NonAlphabetic]),
            ..LanguageProfile::default()
        };

        let filters = FilterSet::for_language(&LanguageCode::new("en"), &profile);

        assert_eq!(filters.filters(), [SolutionFilter::NonAlphabetic]);
    }
}
