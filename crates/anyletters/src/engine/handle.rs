//! The engine handle tying dictionaries, expansion, curation and the cache
//! together.

use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use bon::Builder;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::cache::{ArtifactKind, CacheKey, CacheScope, CacheStore, LengthScope};
use super::catalog::{Dictionary, DictionaryCatalog, LanguageEntry, RawDictionary};
use super::curator::{SolutionCurator, SolutionPool, SolutionSource};
use super::error::{CacheError, EngineError, LoadError};
use super::expander::{ExpansionConfig, FormExpander};
use super::filters::{FilterSet, Filtering};
use super::forms::ExpandedFormSet;
use super::index::{ValidationIndex, Verdict};
use super::profile::LanguageProfile;
use crate::types::{Difficulty, ExpansionMode, Fingerprint, LanguageCode, RevealPolicy};

/// Entry point for validation and curation.
///
/// An engine reads dictionaries from `dictionaries_root`, optionally takes
/// user solution lists from `solutions_root` and filter profiles from
/// `profiles_root`, and persists derived artifacts through an optional
/// [`CacheStore`]. Everything it loads or derives is memoized in memory
/// and shared as `Arc`; the engine is `Send + Sync`. Concurrent requests
/// for the same source, dictionary or artifact wait on one build instead
/// of repeating it, and an edited dictionary is re-read on the next request.
///
/// # Example
///
/// ```no_run
/// use anyletters::{CacheStore, Difficulty, Engine, RoundRequest};
///
/// let engine = Engine::builder()
///     .dictionaries_root("dictionaries")
///     .solutions_root("solutions")
///     .cache(CacheStore::open("cache").unwrap())
///     .build();
///
/// let round = engine
///     .start_round(
///         &RoundRequest::builder()
///             .language("en")
///             .length(5)
///             .difficulty(Difficulty::Easy)
///             .build(),
///     )
///     .unwrap();
/// assert!(!round.solutions().is_empty());
/// ```
#[derive(Builder)]
pub struct Engine {
    /// Directory holding one sub-directory per language.
    #[builder(into)]
    dictionaries_root: PathBuf,

    /// Directory of curated `<code><length>.txt` solution lists.
    #[builder(into)]
    solutions_root: Option<PathBuf>,

    /// Directory of `global.json` and `<archetype>.json` filter profiles.
    #[builder(into)]
    profiles_root: Option<PathBuf>,

    /// Persistent cache. Without one every artifact is recomputed once per
    /// engine.
    cache: Option<CacheStore>,

    #[builder(skip)]
    sources: RwLock<HashMap<LanguageCode, Arc<LoadedSource>>>,

    #[builder(skip)]
    dictionaries: RwLock<HashMap<LanguageCode, Arc<Dictionary>>>,

    #[builder(skip)]
    profiles: RwLock<HashMap<LanguageCode, Arc<LanguageProfile>>>,

    #[builder(skip)]
    forms: RwLock<HashMap<CacheKey, Arc<ExpandedFormSet>>>,

    #[builder(skip)]
    builds: Mutex<HashMap<BuildKey, Arc<Mutex<()>>>>,
}

/// Dictionary bytes with the file stamp they were read under.
#[derive(Debug)]
struct LoadedSource {
    stamp: Fingerprint,
    raw: Arc<RawDictionary>,
}

/// What a build lock serializes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum BuildKey {
    Source(LanguageCode),
    Dictionary(LanguageCode),
    Artifact(CacheKey),
}

/// Parameters of a new round.
#[derive(Debug, Clone, Builder)]
pub struct RoundRequest {
    #[builder(into)]
    pub language: LanguageCode,
    pub length: usize,
    #[builder(default)]
    pub difficulty: Difficulty,
    #[builder(default)]
    pub filtering: Filtering,
}

/// Everything a game controller needs for one round.
#[derive(Debug, Clone)]
pub struct Round {
    language: LanguageCode,
    length: usize,
    difficulty: Difficulty,
    index: ValidationIndex,
    solutions: SolutionPool,
}

impl Round {
    pub fn language(&self) -> &LanguageCode {
        &self.language
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn reveal(&self) -> RevealPolicy {
        self.difficulty.reveal_policy()
    }

    /// Dictionary forms of the round length plus every solution word.
    pub fn index(&self) -> &ValidationIndex {
        &self.index
    }

    pub fn solutions(&self) -> &SolutionPool {
        &self.solutions
    }

    pub fn check(&self, guess: &str) -> Verdict {
        self.index.check(guess, self.length)
    }

    pub fn is_valid(&self, guess: &str) -> bool {
        self.check(guess).is_valid()
    }
}

impl Engine {
    pub fn dictionaries_root(&self) -> &Path {
        &self.dictionaries_root
    }

    pub fn cache(&self) -> Option<&CacheStore> {
        self.cache.as_ref()
    }

    pub fn catalog(&self) -> DictionaryCatalog {
        DictionaryCatalog::new(self.dictionaries_root.clone())
    }

    // =========================================================================
    // Dictionaries
    // =========================================================================

    /// Languages available under the dictionary root.
    pub fn languages(&self) -> Result<Vec<LanguageEntry>, EngineError> {
        self.catalog()
            .languages()
            .map_err(|source| EngineError::CatalogUnavailable { source })
    }

    /// The raw files of a language.
    ///
    /// The files are read once and re-read only when their size or
    /// modification time changes; a re-read drops everything derived from
    /// the old bytes.
    pub fn source(&self, language: &LanguageCode) -> Result<Arc<RawDictionary>, EngineError> {
        let located = self
            .catalog()
            .locate(language)
            .map_err(|source| unavailable(language, source))?;
        let stamp = located
            .stamp()
            .map_err(|source| unavailable(language, source))?;
        if let Some(loaded) = memo_get(&self.sources, language)
            && loaded.stamp == stamp
        {
            return Ok(Arc::clone(&loaded.raw));
        }

        let lock = self.build_lock(BuildKey::Source(language.clone()));
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let stamp = located
            .stamp()
            .map_err(|source| unavailable(language, source))?;
        if let Some(loaded) = memo_get(&self.sources, language) {
            if loaded.stamp == stamp {
                return Ok(Arc::clone(&loaded.raw));
            }
            info!(%language, "dictionary changed on disk, reloading");
            self.forget_derived(language);
        }

        let raw = Arc::new(
            located
                .read()
                .map_err(|source| unavailable(language, source))?,
        );
        debug!(%language, pairs = raw.pairs.len(), fingerprint = %raw.fingerprint(), "read dictionary");
        memo_insert(
            &self.sources,
            language.clone(),
            LoadedSource {
                stamp,
                raw: Arc::clone(&raw),
            },
        );
        Ok(raw)
    }

    /// The parsed dictionary of a language.
    pub fn dictionary(&self, language: &LanguageCode) -> Result<Arc<Dictionary>, EngineError> {
        let raw = self.source(language)?;
        if let Some(dictionary) = memo_get(&self.dictionaries, language) {
            return Ok(dictionary);
        }
        let lock = self.build_lock(BuildKey::Dictionary(language.clone()));
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(dictionary) = memo_get(&self.dictionaries, language) {
            return Ok(dictionary);
        }
        let dictionary = raw
            .parse()
            .map_err(|source| unavailable(language, source))?;
        Ok(memo_insert(&self.dictionaries, language.clone(), dictionary))
    }

    /// The merged filter profile of a language.
    pub fn profile(&self, language: &LanguageCode) -> Result<Arc<LanguageProfile>, EngineError> {
        if let Some(profile) = memo_get(&self.profiles, language) {
            return Ok(profile);
        }
        let profile = match &self.profiles_root {
            Some(root) => LanguageProfile::load(root, language)?,
            None => LanguageProfile::default(),
        };
        Ok(memo_insert(&self.profiles, language.clone(), profile))
    }

    // =========================================================================
    // Expansion and validation
    // =========================================================================

    /// The expansion settings for a language and mode, including the
    /// profile's flag allow-list.
    pub fn expansion_config(
        &self,
        language: &LanguageCode,
        mode: ExpansionMode,
    ) -> Result<ExpansionConfig, EngineError> {
        let config = ExpansionConfig::new(mode);
        Ok(match self.profile(language)?.allowed_flags() {
            Some(flags) if mode == ExpansionMode::Restricted => config.with_allowed_flags(flags),
            _ => config,
        })
    }

    /// The form closure of a language.
    ///
    /// Served from memory, then from the cache when the dictionary bytes
    /// still match, and expanded (and cached) otherwise.
    pub fn expanded_forms(
        &self,
        language: &LanguageCode,
        mode: ExpansionMode,
    ) -> Result<Arc<ExpandedFormSet>, EngineError> {
        let config = self.expansion_config(language, mode)?;
        let key = CacheKey {
            language: language.clone(),
            kind: ArtifactKind::ExpandedForms,
            length: LengthScope::All,
            config: config.fingerprint(),
        };
        let raw = self.source(language)?;
        if let Some(forms) = memo_get(&self.forms, &key) {
            return Ok(forms);
        }

        let lock = self.build_lock(BuildKey::Artifact(key.clone()));
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(forms) = memo_get(&self.forms, &key) {
            return Ok(forms);
        }

        let fingerprint = raw.fingerprint();
        if let Some(forms) = self
            .cache
            .as_ref()
            .and_then(|cache| cache.load::<ExpandedFormSet>(&key, fingerprint))
        {
            info!(%language, ?mode, forms = forms.len(), "loaded expanded forms from cache");
            return Ok(memo_insert(&self.forms, key, forms));
        }

        let dictionary = self.dictionary(language)?;
        let forms = FormExpander::new(&config, language).expand(&dictionary);
        info!(
            %language,
            ?mode,
            stems = dictionary.stem_count(),
            forms = forms.len(),
            "expanded dictionary"
        );
        self.write_cache(&key, fingerprint, &forms);
        Ok(memo_insert(&self.forms, key, forms))
    }

    /// The validation index for words of `length` letters.
    pub fn validation_index(
        &self,
        language: &LanguageCode,
        length: usize,
        difficulty: Difficulty,
    ) -> Result<ValidationIndex, EngineError> {
        let forms = self.expanded_forms(language, difficulty.expansion_mode())?;
        let index = ValidationIndex::for_length(&forms, language, length);
        if index.len_of(length) == 0 {
            return Err(EngineError::NoFormsOfLength {
                language: language.to_string(),
                length,
            });
        }
        Ok(index)
    }

    // =========================================================================
    // Solutions and rounds
    // =========================================================================

    /// The filters a solution request applies.
    pub fn filter_set(
        &self,
        language: &LanguageCode,
        difficulty: Difficulty,
        filtering: Filtering,
    ) -> Result<FilterSet, EngineError> {
        if filtering == Filtering::Disabled || !difficulty.filters_solutions() {
            return Ok(FilterSet::disabled());
        }
        let profile = self.profile(language)?;
        Ok(FilterSet::for_language(language, &profile))
    }

    /// Resolve the secret-word pool for a language and length.
    ///
    /// Sources are tried in order: the user's solutions file (exclusive
    /// when present), a cached curated pool, then the dictionary's forms
    /// through the filter set. The pool records which source produced it.
    pub fn solutions(
        &self,
        language: &LanguageCode,
        length: usize,
        difficulty: Difficulty,
        filtering: Filtering,
    ) -> Result<SolutionPool, EngineError> {
        let filters = self.filter_set(language, difficulty, filtering)?;
        let curator = SolutionCurator::new(language, &filters);

        if let Some(root) = &self.solutions_root {
            let path = SolutionCurator::user_file_path(root, language, length);
            if let Some(pool) = curator.read_user_file(&path, length)? {
                log_pool(&pool);
                return Ok(pool);
            }
            debug!(path = %path.display(), "no solutions file, curating from dictionary");
        }

        let mode = difficulty.expansion_mode();
        let config = self.expansion_config(language, mode)?;
        let key = CacheKey {
            language: language.clone(),
            kind: ArtifactKind::CuratedSolutions,
            length: LengthScope::Exactly(length),
            config: Fingerprint::combine(&[config.fingerprint(), filters.fingerprint()]),
        };
        let fingerprint = self.source(language)?.fingerprint();
        let lock = self.build_lock(BuildKey::Artifact(key.clone()));
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(words) = self
            .cache
            .as_ref()
            .and_then(|cache| cache.load::<BTreeSet<String>>(&key, fingerprint))
            .filter(|words| !words.is_empty())
        {
            let pool = SolutionPool::new(language.clone(), length, words, SolutionSource::Cache);
            log_pool(&pool);
            return Ok(pool);
        }

        let forms = self.expanded_forms(language, mode)?;
        let pool = curator.curate(&forms, length)?;
        self.write_cache(&key, fingerprint, pool.words());
        log_pool(&pool);
        Ok(pool)
    }

    /// Build everything a round needs: the secret pool and an index that
    /// accepts dictionary forms and secrets alike.
    pub fn start_round(&self, request: &RoundRequest) -> Result<Round, EngineError> {
        let language = &request.language;
        let forms = self.expanded_forms(language, request.difficulty.expansion_mode())?;
        let solutions = self.solutions(
            language,
            request.length,
            request.difficulty,
            request.filtering,
        )?;
        let index = ValidationIndex::for_length(&forms, language, request.length)
            .with_words(solutions.iter());
        info!(
            %language,
            length = request.length,
            difficulty = %request.difficulty,
            valid = index.len_of(request.length),
            solutions = solutions.len(),
            "started round"
        );
        Ok(Round {
            language: language.clone(),
            length: request.length,
            difficulty: request.difficulty,
            index,
            solutions,
        })
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Expand several languages in parallel, warming memory and cache.
    ///
    /// Returns the number of forms per language, or the error that stopped
    /// it.
    pub fn prepare(
        &self,
        languages: &[LanguageCode],
        difficulty: Difficulty,
    ) -> Vec<(LanguageCode, Result<usize, EngineError>)> {
        let mode = difficulty.expansion_mode();
        languages
            .par_iter()
            .map(|language| {
                let forms = self.expanded_forms(language, mode).map(|forms| forms.len());
                (language.clone(), forms)
            })
            .collect()
    }

    /// Forget memoized state and remove cache records for a scope.
    ///
    /// The next request re-reads the dictionary files, so edits on disk are
    /// picked up. Returns the number of cache records removed.
    pub fn clear_cache(&self, scope: &CacheScope) -> Result<usize, CacheError> {
        match scope {
            CacheScope::All => {
                clear_memo(&self.sources, |_| true);
                clear_memo(&self.dictionaries, |_| true);
                clear_memo(&self.profiles, |_| true);
                clear_memo(&self.forms, |_| true);
            }
            CacheScope::Language(language) => {
                clear_memo(&self.sources, |code| code == language);
                clear_memo(&self.dictionaries, |code| code == language);
                clear_memo(&self.profiles, |code| code == language);
                clear_memo(&self.forms, |key| key.language == *language);
            }
        }
        match &self.cache {
            Some(cache) => cache.clear(scope),
            None => Ok(0),
        }
    }

    /// Release the engine and its cache handle.
    pub fn close(self) {
        if let Some(cache) = self.cache {
            cache.close();
        }
    }

    /// The lock serializing builds of one key. Callers check their memo
    /// again after taking it.
    fn build_lock(&self, key: BuildKey) -> Arc<Mutex<()>> {
        let mut builds = self.builds.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(builds.entry(key).or_default())
    }

    fn forget_derived(&self, language: &LanguageCode) {
        clear_memo(&self.dictionaries, |code| code == language);
        clear_memo(&self.forms, |key| key.language == *language);
    }

    fn write_cache<T: Serialize>(&self, key: &CacheKey, source: Fingerprint, payload: &T) {
        if let Some(cache) = &self.cache
            && let Err(e) = cache.store(key, source, payload)
        {
            warn!(error = %e, file = %key.file_name(), "failed to write cache record");
        }
    }
}

fn unavailable(language: &LanguageCode, source: LoadError) -> EngineError {
    EngineError::DictionaryUnavailable {
        language: language.to_string(),
        source,
    }
}

fn log_pool(pool: &SolutionPool) {
    info!(
        language = %pool.language(),
        length = pool.length(),
        source = %pool.source(),
        words = pool.len(),
        "resolved solutions"
    );
}

fn memo_get<K: Eq + Hash, V>(memo: &RwLock<HashMap<K, Arc<V>>>, key: &K) -> Option<Arc<V>> {
    memo.read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(key)
        .map(Arc::clone)
}

fn memo_insert<K: Eq + Hash, V>(memo: &RwLock<HashMap<K, Arc<V>>>, key: K, value: V) -> Arc<V> {
    let value = Arc::new(value);
    memo.write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(key, Arc::clone(&value));
    value
}

fn clear_memo<K, V>(memo: &RwLock<HashMap<K, V>>, matches: impl Fn(&K) -> bool) {
    memo.write()
        .unwrap_or_else(PoisonError::into_inner)
        .retain(|key, _| !matches(key));
}
