//! Form expansion: stems plus affix rules to surface forms.

use std::collections::BTreeSet;

use serde::Serialize;

use super::catalog::Dictionary;
use super::forms::{ExpandedFormSet, FormInfo};
use crate::parser::{AffixGrammar, AffixKind, AffixRule, Marker, StemEntry, StemTable};
use crate::types::{ExpansionMode, Fingerprint, Flag, LanguageCode, WordNormalizer};
use crate::types::{letter_count, looks_capitalized};

/// Settings that shape a form closure. Part of every cache key for
/// expanded forms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpansionConfig {
    pub mode: ExpansionMode,
    /// When set, restricted expansion only follows these flags. Without
    /// it, restricted expansion follows suffix flags only.
    pub allowed_flags: Option<BTreeSet<Flag>>,
}

impl ExpansionConfig {
    pub fn new(mode: ExpansionMode) -> Self {
        Self {
            mode,
            allowed_flags: None,
        }
    }

    pub fn restricted() -> Self {
        Self::new(ExpansionMode::Restricted)
    }

    pub fn chaos() -> Self {
        Self::new(ExpansionMode::Chaos)
    }

    /// Limit restricted expansion to `flags`. Chaos mode ignores the list.
    pub fn with_allowed_flags(mut self, flags: impl IntoIterator<Item = Flag>) -> Self {
        self.allowed_flags = Some(flags.into_iter().collect());
        self
    }

    /// Whether expansion follows `flag` for rules of `kind`.
    pub fn permits(&self, flag: &Flag, kind: AffixKind) -> bool {
        match (self.mode, &self.allowed_flags) {
            (ExpansionMode::Restricted, Some(allowed)) => allowed.contains(flag),
            (ExpansionMode::Restricted, None) => kind == AffixKind::Suffix,
            (ExpansionMode::Chaos, _) => true,
        }
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of_str(&format!("{self:?}"))
    }
}

/// Expands the stem tables of a dictionary into an [`ExpandedFormSet`].
///
/// Each stem contributes itself (unless the grammar marks it as needing an
/// affix) and one form per flag group whose first matching rule applies.
/// In chaos mode a suffixed form additionally takes every applicable
/// cross-product prefix.
pub struct FormExpander<'a> {
    config: &'a ExpansionConfig,
    normalizer: WordNormalizer,
}

impl<'a> FormExpander<'a> {
    pub fn new(config: &'a ExpansionConfig, language: &LanguageCode) -> Self {
        Self {
            config,
            normalizer: WordNormalizer::new(language),
        }
    }

    /// Expand every pair of a dictionary into one closure.
    pub fn expand(&self, dictionary: &Dictionary) -> ExpandedFormSet {
        let mut forms = ExpandedFormSet::new();
        for pair in dictionary.pairs() {
            self.expand_into(&pair.grammar, &pair.stems, &mut forms);
        }
        forms
    }

    fn expand_into(&self, grammar: &AffixGrammar, stems: &StemTable, out: &mut ExpandedFormSet) {
        for entry in stems.iter() {
            self.expand_entry(grammar, entry, out);
        }
    }

    fn expand_entry(&self, grammar: &AffixGrammar, entry: &StemEntry, out: &mut ExpandedFormSet) {
        if grammar.is_marked(&entry.flags, Marker::Forbidden)
            || grammar.is_marked(&entry.flags, Marker::OnlyInCompound)
        {
            return;
        }

        let proper = looks_capitalized(&entry.stem);
        let root_len = letter_count(&entry.stem);
        if !grammar.is_marked(&entry.flags, Marker::NeedAffix) {
            self.emit(
                out,
                &entry.stem,
                FormInfo {
                    affixed: false,
                    proper,
                    root_len,
                },
            );
        }

        let affixed = FormInfo {
            affixed: true,
            proper,
            root_len,
        };
        let mut suffixed: Vec<(&AffixRule, String)> = Vec::new();
        let mut prefix_rules: Vec<&AffixRule> = Vec::new();

        for flag in &entry.flags {
            if self.config.permits(flag, AffixKind::Suffix)
                && let Some((rule, form)) = grammar.apply_first(AffixKind::Suffix, flag, &entry.stem)
            {
                self.emit(out, &form, affixed);
                suffixed.push((rule, form));
            }
            if self.config.permits(flag, AffixKind::Prefix)
                && let Some((rule, form)) = grammar.apply_first(AffixKind::Prefix, flag, &entry.stem)
            {
                self.emit(out, &form, affixed);
                prefix_rules.push(rule);
            }
        }

        if self.config.mode != ExpansionMode::Chaos {
            return;
        }
        for (_, word) in suffixed.iter().filter(|(rule, _)| rule.cross_product) {
            for prefix in prefix_rules.iter().filter(|rule| rule.cross_product) {
                if let Some(form) = prefix.apply_rooted(word, &entry.stem) {
                    self.emit(out, &form, affixed);
                }
            }
        }
    }

    fn emit(&self, out: &mut ExpandedFormSet, raw: &str, info: FormInfo) {
        let form = self.normalizer.normalize(raw);
        if form.is_empty() || form.contains(char::is_whitespace) {
            return;
        }
        let letters = letter_count(&form);
        out.insert(form, letters, info);
    }
}
