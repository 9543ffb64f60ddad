//! Persistent cache for expanded forms and curated solution pools.
//!
//! Each artifact is one JSON record at
//! `<root>/<language>/<kind>-<length|all>-<config fingerprint>.json`.
//! A record carries the fingerprint of the dictionary bytes it was derived
//! from and is only served while that fingerprint still matches.

use std::fs::{create_dir_all, read, read_dir, remove_dir_all, remove_file};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::error::CacheError;
use crate::types::{Fingerprint, LanguageCode};

/// Version of the record layout. Records of other versions are misses.
pub const CACHE_FORMAT: u32 = 2;

/// What a cache record holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    ExpandedForms,
    CuratedSolutions,
}

impl ArtifactKind {
    fn file_stem(self) -> &'static str {
        match self {
            ArtifactKind::ExpandedForms => "forms",
            ArtifactKind::CuratedSolutions => "solutions",
        }
    }
}

/// The word length a record covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthScope {
    All,
    Exactly(usize),
}

/// Identity of a cached artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub language: LanguageCode,
    pub kind: ArtifactKind,
    pub length: LengthScope,
    /// Fingerprint of the configuration the artifact was built with.
    pub config: Fingerprint,
}

impl CacheKey {
    pub fn file_name(&self) -> String {
        let length = match self.length {
            LengthScope::All => "all".to_string(),
            LengthScope::Exactly(n) => n.to_string(),
        };
        format!("{}-{length}-{}.json", self.kind.file_stem(), self.config)
    }
}

/// Which records [`CacheStore::clear`] removes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheScope {
    All,
    Language(LanguageCode),
}

/// Result of a [`CacheStore::store`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    Written,
    /// An identical record was already present; nothing was written.
    Unchanged,
}

#[derive(Serialize, Deserialize)]
struct CacheRecord<T> {
    format: u32,
    key: CacheKey,
    source_fingerprint: Fingerprint,
    payload: T,
}

/// Handle to a cache directory.
///
/// Writes go to a temporary file in the record's directory which is then
/// renamed over the record, so readers never observe partial records.
#[derive(Debug)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    /// Open (creating if needed) a cache rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let root = root.into();
        create_dir_all(&root).map_err(|source| CacheError::Io {
            path: root.clone(),
            source,
        })?;
        debug!(root = %root.display(), "opened cache");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.language_dir(&key.language).join(key.file_name())
    }

    /// Load a record if it exists and was derived from `source`.
    ///
    /// Corrupt records are logged, deleted and reported as a miss.
    pub fn load<T: DeserializeOwned>(&self, key: &CacheKey, source: Fingerprint) -> Option<T> {
        match self.try_load(key, source) {
            Ok(hit) => hit,
            Err(CacheError::Corrupt { path, reason }) => {
                warn!(path = %path.display(), %reason, "discarding corrupt cache record");
                if let Err(e) = remove_file(&path) {
                    warn!(path = %path.display(), error = %e, "failed to remove corrupt cache record");
                }
                None
            }
            Err(e) => {
                warn!(error = %e, "cache read failed");
                None
            }
        }
    }

    /// Like [`load`](Self::load) but returns read errors instead of
    /// recovering from them.
    pub fn try_load<T: DeserializeOwned>(
        &self,
        key: &CacheKey,
        source: Fingerprint,
    ) -> Result<Option<T>, CacheError> {
        let path = self.path_for(key);
        let bytes = match read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(file = %key.file_name(), "cache miss");
                return Ok(None);
            }
            Err(source) => return Err(CacheError::Io { path, source }),
        };
        let record: CacheRecord<T> =
            serde_json::from_slice(&bytes).map_err(|e| CacheError::Corrupt {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        if record.format != CACHE_FORMAT || record.key != *key {
            debug!(file = %key.file_name(), "cache record does not match key");
            return Ok(None);
        }
        if record.source_fingerprint != source {
            debug!(file = %key.file_name(), "cache record is stale");
            return Ok(None);
        }
        debug!(file = %key.file_name(), "cache hit");
        Ok(Some(record.payload))
    }

    /// Write a record. Storing the same payload twice leaves the file
    /// untouched.
    pub fn store<T: Serialize>(
        &self,
        key: &CacheKey,
        source: Fingerprint,
        payload: &T,
    ) -> Result<StoreOutcome, CacheError> {
        let record = CacheRecord {
            format: CACHE_FORMAT,
            key: key.clone(),
            source_fingerprint: source,
            payload,
        };
        let bytes = serde_json::to_vec(&record)?;
        let path = self.path_for(key);
        if read(&path).is_ok_and(|existing| existing == bytes) {
            debug!(file = %key.file_name(), "cache record unchanged");
            return Ok(StoreOutcome::Unchanged);
        }

        let dir = self.language_dir(&key.language);
        let io_error = |source| CacheError::Io {
            path: dir.clone(),
            source,
        };
        create_dir_all(&dir).map_err(io_error)?;
        let mut temp_file = NamedTempFile::new_in(&dir).map_err(io_error)?;
        temp_file.write_all(&bytes).map_err(io_error)?;
        temp_file.persist(&path).map_err(|e| CacheError::Io {
            path: path.clone(),
            source: e.error,
        })?;
        info!(file = %key.file_name(), language = %key.language, "wrote cache record");
        Ok(StoreOutcome::Written)
    }

    /// Remove cached records. Returns the number of records removed.
    pub fn clear(&self, scope: &CacheScope) -> Result<usize, CacheError> {
        let removed = match scope {
            CacheScope::Language(language) => remove_records(&self.language_dir(language))?,
            CacheScope::All => {
                let entries = read_dir(&self.root).map_err(|source| CacheError::Io {
                    path: self.root.clone(),
                    source,
                })?;
                let mut removed = 0;
                for entry in entries {
                    let entry = entry.map_err(|source| CacheError::Io {
                        path: self.root.clone(),
                        source,
                    })?;
                    if entry.path().is_dir() {
                        removed += remove_records(&entry.path())?;
                    }
                }
                removed
            }
        };
        info!(?scope, removed, "cleared cache");
        Ok(removed)
    }

    /// Release the handle. Records are written through, so there is nothing
    /// to flush.
    pub fn close(self) {
        debug!(root = %self.root.display(), "closed cache");
    }

    fn language_dir(&self, language: &LanguageCode) -> PathBuf {
        self.root.join(language.path_component())
    }
}

/// Delete a language directory, returning how many records it held.
fn remove_records(dir: &Path) -> Result<usize, CacheError> {
    let io_error = |source| CacheError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let entries = match read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(io_error(e)),
    };
    let mut count = 0;
    for entry in entries {
        let path = entry.map_err(io_error)?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            count += 1;
        }
    }
    remove_dir_all(dir).map_err(io_error)?;
    Ok(count)
}
