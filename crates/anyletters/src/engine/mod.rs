//! Dictionary engine: expansion, validation, curation and caching.
//!
//! The [`Engine`] handle is the entry point. The components it drives are
//! public so that tools can use them directly, for example expanding an
//! in-memory [`Dictionary`] without touching the file system.

mod cache;
mod catalog;
mod curator;
mod error;
mod expander;
mod filters;
mod forms;
mod handle;
mod index;
pub mod language_meta;
mod profile;

pub use cache::{
    ArtifactKind, CACHE_FORMAT, CacheKey, CacheScope, CacheStore, LengthScope, StoreOutcome,
};
pub use catalog::{
    Dictionary, DictionaryCatalog, DictionaryPair, DictionarySource, LanguageEntry, PRIMARY_PAIR,
    PairPaths, RawDictionary, RawPair,
};
pub use curator::{SolutionCurator, SolutionPool, SolutionSource};
pub use error::{CacheError, EngineError, LoadError, compute_suggestions};
pub use expander::{ExpansionConfig, FormExpander};
pub use filters::{DEFAULT_MIN_ROOT_LEN, FilterSet, Filtering, SolutionFilter};
pub use forms::{ExpandedFormSet, FormInfo};
pub use handle::{Engine, Round, RoundRequest};
pub use index::{ValidationIndex, Verdict};
pub use profile::{GLOBAL_PROFILE, LanguageProfile};
