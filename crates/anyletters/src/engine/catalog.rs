//! Dictionary discovery and loading.
//!
//! A dictionary root holds one directory per language. A directory is a
//! language when it contains `index.aff` and `index.dic`; every further
//! `<name>.aff`/`<name>.dic` pair next to them is loaded too.

use std::collections::BTreeMap;
use std::fs::{metadata, read, read_dir};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use tracing::{info, warn};

use super::error::{LoadError, compute_suggestions};
use crate::parser::{AffixGrammar, ParseError, StemTable, parse_affix_grammar, parse_stem_table};
use crate::types::{Fingerprint, LanguageCode};

/// Base name of the pair every language directory must contain.
pub const PRIMARY_PAIR: &str = "index";

/// A language available under the dictionary root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageEntry {
    pub code: LanguageCode,
    /// The directory name as spelled on disk.
    pub directory: String,
}

/// Paths of one `.aff`/`.dic` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairPaths {
    pub name: String,
    pub aff: PathBuf,
    pub dic: PathBuf,
}

/// Discovers language directories under a dictionary root.
#[derive(Debug, Clone)]
pub struct DictionaryCatalog {
    root: PathBuf,
}

impl DictionaryCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Languages with a primary pair, sorted case-insensitively.
    pub fn languages(&self) -> Result<Vec<LanguageEntry>, LoadError> {
        let entries = read_dir(&self.root).map_err(|source| LoadError::Io {
            path: self.root.clone(),
            source,
        })?;
        let mut languages: Vec<LanguageEntry> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_dir())
            .filter(|entry| has_primary_pair(&entry.path()))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .map(|directory| LanguageEntry {
                code: LanguageCode::new(&directory),
                directory,
            })
            .collect();
        languages.sort_by(|a, b| a.code.cmp(&b.code).then_with(|| a.directory.cmp(&b.directory)));
        Ok(languages)
    }

    /// Find the directory of a language, matching the code
    /// case-insensitively.
    pub fn locate(&self, language: &LanguageCode) -> Result<DictionarySource, LoadError> {
        let languages = self.languages()?;
        let Some(entry) = languages.iter().find(|entry| entry.code == *language) else {
            return Err(LoadError::NotFound {
                language: language.to_string(),
                suggestions: compute_suggestions(
                    language.as_str(),
                    languages.iter().map(|entry| entry.code.as_str()),
                ),
            });
        };
        let directory = self.root.join(&entry.directory);
        let pairs = find_pairs(&directory)?;
        Ok(DictionarySource {
            language: language.clone(),
            directory,
            pairs,
        })
    }
}

fn has_primary_pair(dir: &Path) -> bool {
    dir.join(format!("{PRIMARY_PAIR}.aff")).is_file()
        && dir.join(format!("{PRIMARY_PAIR}.dic")).is_file()
}

/// Pairs in a language directory: the primary pair first, then the rest
/// by name. A file without its partner is ignored with a warning.
fn find_pairs(dir: &Path) -> Result<Vec<PairPaths>, LoadError> {
    let entries = read_dir(dir).map_err(|source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut affs = BTreeMap::new();
    let mut dics = BTreeMap::new();
    for path in entries.filter_map(Result::ok).map(|entry| entry.path()) {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
            continue;
        };
        match path.extension().and_then(|e| e.to_str()) {
            Some("aff") => {
                affs.insert(stem, path);
            }
            Some("dic") => {
                dics.insert(stem, path);
            }
            _ => {}
        }
    }

    let mut pairs = Vec::new();
    for (name, aff) in affs {
        match dics.remove(&name) {
            Some(dic) => pairs.push(PairPaths { name, aff, dic }),
            None => warn!(path = %aff.display(), "affix file without stem table"),
        }
    }
    for dic in dics.values() {
        warn!(path = %dic.display(), "stem table without affix file");
    }
    pairs.sort_by_key(|pair| (pair.name != PRIMARY_PAIR, pair.name.clone()));
    Ok(pairs)
}

/// The located files of one language.
#[derive(Debug, Clone)]
pub struct DictionarySource {
    pub language: LanguageCode,
    pub directory: PathBuf,
    pub pairs: Vec<PairPaths>,
}

impl DictionarySource {
    /// Fingerprint of every pair's name, size and modification time.
    ///
    /// Cheap enough to take on every request; a changed stamp means the
    /// bytes must be read again.
    pub fn stamp(&self) -> Result<Fingerprint, LoadError> {
        let file_stamp = |path: &Path| -> Result<Fingerprint, LoadError> {
            let meta = metadata(path).map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let modified = meta
                .modified()
                .ok()
                .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
                .map_or(0, |since| since.as_nanos());
            Ok(Fingerprint::combine(&[
                Fingerprint::of_bytes(&meta.len().to_le_bytes()),
                Fingerprint::of_bytes(&modified.to_le_bytes()),
            ]))
        };
        let mut parts = Vec::with_capacity(self.pairs.len() * 3);
        for paths in &self.pairs {
            parts.push(Fingerprint::of_str(&paths.name));
            parts.push(file_stamp(&paths.aff)?);
            parts.push(file_stamp(&paths.dic)?);
        }
        Ok(Fingerprint::combine(&parts))
    }

    /// Read every pair's bytes.
    pub fn read(&self) -> Result<RawDictionary, LoadError> {
        let read_file = |path: &Path| {
            read(path).map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })
        };
        let pairs = self
            .pairs
            .iter()
            .map(|paths| {
                Ok(RawPair {
                    aff: read_file(&paths.aff)?,
                    dic: read_file(&paths.dic)?,
                    paths: paths.clone(),
                })
            })
            .collect::<Result<Vec<_>, LoadError>>()?;
        Ok(RawDictionary {
            language: self.language.clone(),
            pairs,
        })
    }
}

/// Bytes of one pair as read from disk.
#[derive(Debug, Clone)]
pub struct RawPair {
    pub paths: PairPaths,
    pub aff: Vec<u8>,
    pub dic: Vec<u8>,
}

/// The unparsed files of one language.
#[derive(Debug, Clone)]
pub struct RawDictionary {
    pub language: LanguageCode,
    pub pairs: Vec<RawPair>,
}

impl RawDictionary {
    /// Fingerprint of every byte of every pair, in pair order.
    pub fn fingerprint(&self) -> Fingerprint {
        let parts: Vec<Fingerprint> = self
            .pairs
            .iter()
            .flat_map(|pair| {
                [
                    Fingerprint::of_str(&pair.paths.name),
                    Fingerprint::of_bytes(&pair.aff),
                    Fingerprint::of_bytes(&pair.dic),
                ]
            })
            .collect();
        Fingerprint::combine(&parts)
    }

    /// Decode and parse every pair.
    pub fn parse(&self) -> Result<Dictionary, LoadError> {
        let pairs = self
            .pairs
            .iter()
            .map(|raw| {
                let grammar = AffixGrammar::from_bytes(&raw.aff).map_err(|source| {
                    LoadError::Parse {
                        path: raw.paths.aff.clone(),
                        source,
                    }
                })?;
                let stems = StemTable::from_bytes(&raw.dic, &grammar).map_err(|source| {
                    LoadError::Parse {
                        path: raw.paths.dic.clone(),
                        source,
                    }
                })?;
                for warning in stems.warnings() {
                    warn!(path = %raw.paths.dic.display(), %warning, "stem table warning");
                }
                info!(
                    language = %self.language,
                    pair = %raw.paths.name,
                    encoding = grammar.encoding().name(),
                    rules = grammar.rule_count(),
                    stems = stems.len(),
                    "loaded dictionary pair"
                );
                Ok(DictionaryPair {
                    name: raw.paths.name.clone(),
                    grammar,
                    stems,
                })
            })
            .collect::<Result<Vec<_>, LoadError>>()?;
        Ok(Dictionary {
            language: self.language.clone(),
            pairs,
        })
    }
}

/// A parsed grammar and its stem table.
#[derive(Debug, Clone)]
pub struct DictionaryPair {
    pub name: String,
    pub grammar: AffixGrammar,
    pub stems: StemTable,
}

/// Every parsed pair of one language.
#[derive(Debug, Clone)]
pub struct Dictionary {
    language: LanguageCode,
    pairs: Vec<DictionaryPair>,
}

impl Dictionary {
    /// Build a single-pair dictionary from decoded text.
    pub fn from_texts(
        language: impl Into<LanguageCode>,
        aff: &str,
        dic: &str,
    ) -> Result<Self, ParseError> {
        let grammar = parse_affix_grammar(aff)?;
        let stems = parse_stem_table(dic, &grammar)?;
        Ok(Self {
            language: language.into(),
            pairs: vec![DictionaryPair {
                name: PRIMARY_PAIR.to_string(),
                grammar,
                stems,
            }],
        })
    }

    pub fn language(&self) -> &LanguageCode {
        &self.language
    }

    pub fn pairs(&self) -> &[DictionaryPair] {
        &self.pairs
    }

    /// Total stem entries across all pairs.
    pub fn stem_count(&self) -> usize {
        self.pairs.iter().map(|pair| pair.stems.len()).sum()
    }
}
