use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Provenance of an expanded form, merged over every derivation of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormInfo {
    /// Every derivation applied at least one affix.
    pub affixed: bool,
    /// Every derivation started from a capitalized stem.
    pub proper: bool,
    /// Letter count of the longest stem the form derives from.
    pub root_len: usize,
}

impl FormInfo {
    pub fn merge(self, other: FormInfo) -> FormInfo {
        FormInfo {
            affixed: self.affixed && other.affixed,
            proper: self.proper && other.proper,
            root_len: self.root_len.max(other.root_len),
        }
    }
}

/// The surface forms of a dictionary, partitioned by letter count.
///
/// Ordered maps keep iteration and serialization deterministic: the same
/// dictionary and configuration always produce byte-identical output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandedFormSet {
    partitions: BTreeMap<usize, BTreeMap<String, FormInfo>>,
}

impl ExpandedFormSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a normalized form of `letters` letters, merging provenance with
    /// any earlier derivation of the same form.
    pub fn insert(&mut self, form: String, letters: usize, info: FormInfo) {
        self.partitions
            .entry(letters)
            .or_default()
            .entry(form)
            .and_modify(|existing| *existing = existing.merge(info))
            .or_insert(info);
    }

    /// Merge another set into this one.
    pub fn extend(&mut self, other: ExpandedFormSet) {
        for (letters, forms) in other.partitions {
            for (form, info) in forms {
                self.insert(form, letters, info);
            }
        }
    }

    /// Forms of one length with their provenance, in lexical order.
    pub fn forms_of_length(&self, length: usize) -> impl Iterator<Item = (&str, FormInfo)> {
        self.partitions
            .get(&length)
            .into_iter()
            .flatten()
            .map(|(form, info)| (form.as_str(), *info))
    }

    pub fn words_of_length(&self, length: usize) -> impl Iterator<Item = &str> {
        self.forms_of_length(length).map(|(form, _)| form)
    }

    pub fn count_of_length(&self, length: usize) -> usize {
        self.partitions.get(&length).map_or(0, BTreeMap::len)
    }

    /// Lengths with at least one form, ascending.
    pub fn lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.partitions.keys().copied()
    }

    pub fn info(&self, form: &str) -> Option<FormInfo> {
        self.partitions
            .values()
            .find_map(|forms| forms.get(form).copied())
    }

    pub fn contains(&self, form: &str) -> bool {
        self.info(form).is_some()
    }

    /// Total number of forms across all lengths.
    pub fn len(&self) -> usize {
        self.partitions.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.values().all(BTreeMap::is_empty)
    }
}
