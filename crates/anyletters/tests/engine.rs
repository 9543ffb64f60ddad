//! Tests for the engine handle: discovery, curation, rounds and caching.

use std::fs::{create_dir_all, read_dir, write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use anyletters::{
    CacheScope, CacheStore, Difficulty, Engine, EngineError, ExpansionMode, Filtering,
    LanguageCode, LoadError, RevealPolicy, RoundRequest, SolutionSource, Verdict,
};
use tempfile::TempDir;

const ENGLISH_AFF: &str = "\
SET UTF-8
TRY esianrtolcdugmphbyfvkwz

PFX U Y 1
PFX U 0 un .

SFX S Y 2
SFX S y ies [^aeiou]y
SFX S 0 s [^y]

SFX D Y 2
SFX D 0 d e
SFX D 0 ed [^e]

SFX G Y 2
SFX G e ing e
SFX G 0 ing [^e]
";

const ENGLISH_DIC: &str = "\
8
bake/DGS
lock/UDS
house/S
apple/S
Paris
tiger/S
ox
story/S
";

const FRENCH_AFF: &str = "SET UTF-8\nSFX S Y 1\nSFX S 0 s .\n";
const FRENCH_DIC: &str = "3\nlivre/S\ntable/S\nchat/S\n";

const GERMAN_AFF: &str = "SET UTF-8\nSFX N Y 1\nSFX N 0 n .\n";
const GERMAN_DIC: &str = "3\nKatze/N\nHund\nStraße\n";

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let fixture = Fixture {
            dir: TempDir::new().unwrap(),
        };
        fixture.write("dictionaries/en/index.aff", ENGLISH_AFF);
        fixture.write("dictionaries/en/index.dic", ENGLISH_DIC);
        fixture.write("dictionaries/fr/index.aff", FRENCH_AFF);
        fixture.write("dictionaries/fr/index.dic", FRENCH_DIC);
        fixture.write("dictionaries/De-AT/index.aff", GERMAN_AFF);
        fixture.write("dictionaries/De-AT/index.dic", GERMAN_DIC);
        create_dir_all(fixture.path("solutions")).unwrap();
        create_dir_all(fixture.path("profiles")).unwrap();
        fixture
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        create_dir_all(path.parent().unwrap()).unwrap();
        write(path, content).unwrap();
    }

    fn engine(&self) -> Engine {
        Engine::builder()
            .dictionaries_root(self.path("dictionaries"))
            .solutions_root(self.path("solutions"))
            .profiles_root(self.path("profiles"))
            .cache(CacheStore::open(self.path("cache")).unwrap())
            .build()
    }

    fn engine_without_cache(&self) -> Engine {
        Engine::builder()
            .dictionaries_root(self.path("dictionaries"))
            .solutions_root(self.path("solutions"))
            .profiles_root(self.path("profiles"))
            .build()
    }
}

fn code(language: &str) -> LanguageCode {
    LanguageCode::new(language)
}

fn words(pool: &anyletters::SolutionPool) -> Vec<&str> {
    pool.iter().collect()
}

fn count_records(dir: &Path) -> usize {
    read_dir(dir).map_or(0, |entries| entries.count())
}

// =========================================================================
// Discovery
// =========================================================================

#[test]
fn languages_are_listed_case_insensitively() {
    let fixture = Fixture::new();
    fixture.write("dictionaries/broken/index.aff", FRENCH_AFF);
    fixture.write("dictionaries/notes.txt", "not a language");

    let languages = fixture.engine().languages().unwrap();

    let codes: Vec<&str> = languages.iter().map(|entry| entry.code.as_str()).collect();
    assert_eq!(codes, vec!["de-at", "en", "fr"]);
    assert_eq!(languages[0].directory, "De-AT");
}

#[test]
fn language_codes_resolve_case_insensitively() {
    let fixture = Fixture::new();
    let engine = fixture.engine();

    let dictionary = engine.dictionary(&code("DE-at")).unwrap();
    assert_eq!(dictionary.stem_count(), 3);
}

#[test]
fn unknown_language_suggests_near_misses() {
    let fixture = Fixture::new();

    let err = fixture.engine().dictionary(&code("fn")).unwrap_err();

    match err {
        EngineError::DictionaryUnavailable {
            source: LoadError::NotFound { suggestions, .. },
            ..
        } => assert_eq!(suggestions, vec!["en", "fr"]),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_dictionary_root_is_reported() {
    let engine = Engine::builder().dictionaries_root("/nonexistent/dictionaries").build();
    assert!(matches!(
        engine.languages(),
        Err(EngineError::CatalogUnavailable { .. })
    ));
}

#[test]
fn parse_failure_makes_dictionary_unavailable() {
    let fixture = Fixture::new();
    fixture.write("dictionaries/en/index.aff", "SFX A Y 3\nSFX A 0 s .\n");

    let err = fixture
        .engine()
        .expanded_forms(&code("en"), ExpansionMode::Restricted)
        .unwrap_err();

    assert!(matches!(
        err,
        EngineError::DictionaryUnavailable {
            source: LoadError::Parse { .. },
            ..
        }
    ));
}

#[test]
fn extra_pairs_in_language_directory_are_merged() {
    let fixture = Fixture::new();
    fixture.write("dictionaries/en/names.aff", "SET UTF-8\n");
    fixture.write("dictionaries/en/names.dic", "1\nzebra\n");
    fixture.write("dictionaries/en/orphan.dic", "1\nquartz\n");

    let engine = fixture.engine();
    let forms = engine
        .expanded_forms(&code("en"), ExpansionMode::Restricted)
        .unwrap();

    assert!(forms.contains("zebra"));
    assert!(forms.contains("baking"));
    assert!(!forms.contains("quartz"));
    assert_eq!(engine.dictionary(&code("en")).unwrap().pairs().len(), 2);
}

// =========================================================================
// Solution Resolution
// =========================================================================

#[test]
fn missing_solutions_file_falls_back_to_dictionary() {
    let fixture = Fixture::new();

    let pool = fixture
        .engine()
        .solutions(&code("fr"), 5, Difficulty::Medium, Filtering::Enabled)
        .unwrap();

    assert_eq!(pool.source(), &SolutionSource::Dictionary { filtered: true });
    assert_eq!(words(&pool), vec!["chats", "livre", "table"]);
}

#[test]
fn default_filters_remove_proper_nouns() {
    let fixture = Fixture::new();

    let pool = fixture
        .engine()
        .solutions(&code("en"), 5, Difficulty::Medium, Filtering::Enabled)
        .unwrap();

    assert_eq!(
        words(&pool),
        vec!["apple", "baked", "bakes", "house", "locks", "story", "tiger"]
    );
}

#[test]
fn profane_words_are_filtered_by_default() {
    let fixture = Fixture::new();
    fixture.write("dictionaries/en/index.dic", "3\nshit\ntree\nfuck\n");
    let engine = fixture.engine();

    let filtered = engine
        .solutions(&code("en"), 4, Difficulty::Medium, Filtering::Enabled)
        .unwrap();
    let unfiltered = engine
        .solutions(&code("en"), 4, Difficulty::Medium, Filtering::Disabled)
        .unwrap();

    assert_eq!(words(&filtered), vec!["tree"]);
    assert!(unfiltered.contains("shit"));
}

#[test]
fn disabled_filters_keep_every_form() {
    let fixture = Fixture::new();

    let pool = fixture
        .engine()
        .solutions(&code("en"), 5, Difficulty::Medium, Filtering::Disabled)
        .unwrap();

    assert_eq!(pool.source(), &SolutionSource::Dictionary { filtered: false });
    assert!(pool.contains("paris"));
}

#[test]
fn chaos_skips_filters_and_adds_combinations() {
    let fixture = Fixture::new();

    let pool = fixture
        .engine()
        .solutions(&code("en"), 7, Difficulty::Chaos, Filtering::Enabled)
        .unwrap();

    assert_eq!(pool.source(), &SolutionSource::Dictionary { filtered: false });
    assert!(pool.contains("unlocks"));
}

#[test]
fn nouns_stay_in_languages_that_capitalize_them() {
    let fixture = Fixture::new();

    let pool = fixture
        .engine()
        .solutions(&code("de-at"), 5, Difficulty::Medium, Filtering::Enabled)
        .unwrap();

    assert_eq!(words(&pool), vec!["katze"]);
}

#[test]
fn user_file_is_the_exclusive_source() {
    let fixture = Fixture::new();
    fixture.write("solutions/en5.txt", "Crane\n\nslate\nHOUSE\nbananas\nslate\n");

    let pool = fixture
        .engine()
        .solutions(&code("en"), 5, Difficulty::Medium, Filtering::Enabled)
        .unwrap();

    assert_eq!(
        pool.source(),
        &SolutionSource::UserFile {
            path: fixture.path("solutions/en5.txt")
        }
    );
    assert_eq!(words(&pool), vec!["crane", "house", "slate"]);
}

#[test]
fn empty_user_file_is_no_solutions() {
    let fixture = Fixture::new();
    fixture.write("solutions/en5.txt", "\n  \nbananas\n");

    let err = fixture
        .engine()
        .solutions(&code("en"), 5, Difficulty::Medium, Filtering::Enabled)
        .unwrap_err();

    assert!(matches!(
        err,
        EngineError::NoSolutionsAvailable {
            length: 5,
            origin: SolutionSource::UserFile { .. },
            ..
        }
    ));
}

#[test]
fn filtering_everything_is_no_solutions() {
    let fixture = Fixture::new();
    fixture.write(
        "profiles/fr.json",
        r#"{ "blacklist": ["LIVRE", "table"], "suffixes": ["s"] }"#,
    );

    let err = fixture
        .engine()
        .solutions(&code("fr"), 5, Difficulty::Medium, Filtering::Enabled)
        .unwrap_err();

    assert!(matches!(
        err,
        EngineError::NoSolutionsAvailable {
            origin: SolutionSource::Dictionary { filtered: true },
            ..
        }
    ));
}

#[test]
fn length_without_forms_is_reported() {
    let fixture = Fixture::new();
    let engine = fixture.engine();

    let err = engine
        .solutions(&code("en"), 12, Difficulty::Medium, Filtering::Enabled)
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::NoFormsOfLength { length: 12, .. }
    ));

    let err = engine
        .validation_index(&code("en"), 12, Difficulty::Medium)
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::NoFormsOfLength { length: 12, .. }
    ));
}

// =========================================================================
// Profiles
// =========================================================================

#[test]
fn global_and_archetype_profiles_merge() {
    let fixture = Fixture::new();
    fixture.write("profiles/global.json", r#"{ "blacklist": ["apple"] }"#);
    fixture.write(
        "profiles/en.json",
        r#"{ "prefixes": ["ba"], "blacklist_files": ["en-extra.txt", "missing.txt"] }"#,
    );
    fixture.write("profiles/en-extra.txt", "Tiger\n");

    let pool = fixture
        .engine()
        .solutions(&code("en"), 5, Difficulty::Medium, Filtering::Enabled)
        .unwrap();

    assert_eq!(words(&pool), vec!["house", "locks", "story"]);
}

#[test]
fn profile_filters_replace_defaults() {
    let fixture = Fixture::new();
    fixture.write("profiles/en.json", r#"{ "filters": [{ "kind": "affixed_forms" }] }"#);

    let pool = fixture
        .engine()
        .solutions(&code("en"), 5, Difficulty::Medium, Filtering::Enabled)
        .unwrap();

    assert_eq!(words(&pool), vec!["apple", "house", "paris", "story", "tiger"]);
}

#[test]
fn restricted_flags_limit_expansion() {
    let fixture = Fixture::new();
    fixture.write("profiles/en.json", r#"{ "restricted_flags": ["S"] }"#);
    let engine = fixture.engine();

    let restricted = engine
        .expanded_forms(&code("en"), ExpansionMode::Restricted)
        .unwrap();
    assert!(restricted.contains("houses"));
    assert!(!restricted.contains("baking"));

    let chaos = engine.expanded_forms(&code("en"), ExpansionMode::Chaos).unwrap();
    assert!(chaos.contains("baking"));
}

#[test]
fn invalid_profile_is_an_error() {
    let fixture = Fixture::new();
    fixture.write("profiles/global.json", "{ \"blacklist\": 3 }");

    let err = fixture
        .engine()
        .solutions(&code("en"), 5, Difficulty::Medium, Filtering::Enabled)
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidProfile { .. }));
}

// =========================================================================
// Rounds
// =========================================================================

#[test]
fn round_accepts_dictionary_forms_and_solutions() {
    let fixture = Fixture::new();
    fixture.write("solutions/en5.txt", "crane\nslate\n");

    let round = fixture
        .engine()
        .start_round(
            &RoundRequest::builder()
                .language("EN")
                .length(5)
                .difficulty(Difficulty::Easy)
                .build(),
        )
        .unwrap();

    assert_eq!(round.reveal(), RevealPolicy::OneLetter);
    assert_eq!(round.solutions().len(), 2);
    assert_eq!(round.check("CRANE"), Verdict::Valid);
    assert_eq!(round.check("tiger"), Verdict::Valid);
    assert_eq!(round.check("zzzzz"), Verdict::Unknown);
    assert_eq!(
        round.check("baking"),
        Verdict::WrongLength {
            expected: 5,
            actual: 6
        }
    );
}

#[test]
fn round_accepts_transliterated_guesses() {
    let fixture = Fixture::new();
    fixture.write("dictionaries/de-CH/index.aff", "SET UTF-8\n");
    fixture.write("dictionaries/de-CH/index.dic", "2\nStrasse\nKaffee\n");

    let round = fixture
        .engine()
        .start_round(
            &RoundRequest::builder()
                .language("de-ch")
                .length(6)
                .difficulty(Difficulty::Medium)
                .build(),
        )
        .unwrap();

    assert_eq!(round.check("Kaffee"), Verdict::Valid);
    assert_eq!(round.check("straße"), Verdict::Valid);
    assert_eq!(round.check("größte"), Verdict::Unknown);
    assert_eq!(
        round.check("strasse"),
        Verdict::WrongLength {
            expected: 6,
            actual: 7
        }
    );
}

#[test]
fn round_defaults_to_medium() {
    let fixture = Fixture::new();

    let round = fixture
        .engine()
        .start_round(&RoundRequest::builder().language("fr").length(5).build())
        .unwrap();

    assert_eq!(round.difficulty(), Difficulty::Medium);
    assert_eq!(round.reveal(), RevealPolicy::None);
    assert!(round.is_valid("livre"));
    assert!(round
        .solutions()
        .iter()
        .all(|word| round.index().is_valid(word, 5)));
}

// =========================================================================
// Caching
// =========================================================================

#[test]
fn second_engine_reads_pool_from_cache() {
    let fixture = Fixture::new();

    let first = fixture
        .engine()
        .solutions(&code("fr"), 5, Difficulty::Medium, Filtering::Enabled)
        .unwrap();
    let second = fixture
        .engine()
        .solutions(&code("fr"), 5, Difficulty::Medium, Filtering::Enabled)
        .unwrap();

    assert_eq!(second.source(), &SolutionSource::Cache);
    assert_eq!(first.words(), second.words());
    assert_eq!(count_records(&fixture.path("cache/fr")), 2);
}

#[test]
fn editing_the_dictionary_invalidates_the_cache() {
    let fixture = Fixture::new();
    fixture
        .engine()
        .expanded_forms(&code("fr"), ExpansionMode::Restricted)
        .unwrap();

    fixture.write("dictionaries/fr/index.dic", "4\nlivre/S\ntable/S\nchat/S\nplume/S\n");
    let forms = fixture
        .engine()
        .expanded_forms(&code("fr"), ExpansionMode::Restricted)
        .unwrap();

    assert!(forms.contains("plumes"));
}

#[test]
fn one_engine_sees_dictionary_edits() {
    let fixture = Fixture::new();
    let engine = fixture.engine();
    let before = engine
        .expanded_forms(&code("fr"), ExpansionMode::Restricted)
        .unwrap();
    assert!(!before.contains("plumes"));

    fixture.write("dictionaries/fr/index.dic", "4\nlivre/S\ntable/S\nchat/S\nplume/S\n");
    let after = engine
        .expanded_forms(&code("fr"), ExpansionMode::Restricted)
        .unwrap();

    assert!(after.contains("plumes"));
    assert_eq!(engine.dictionary(&code("fr")).unwrap().stem_count(), 4);
}

#[test]
fn unchanged_dictionary_is_served_from_memory() {
    let fixture = Fixture::new();
    let engine = fixture.engine_without_cache();

    let first = engine
        .expanded_forms(&code("fr"), ExpansionMode::Restricted)
        .unwrap();
    let second = engine
        .expanded_forms(&code("fr"), ExpansionMode::Restricted)
        .unwrap();

    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn cached_forms_match_fresh_expansion() {
    let fixture = Fixture::new();

    let fresh = fixture
        .engine_without_cache()
        .expanded_forms(&code("en"), ExpansionMode::Chaos)
        .unwrap();
    fixture
        .engine()
        .expanded_forms(&code("en"), ExpansionMode::Chaos)
        .unwrap();
    let cached = fixture
        .engine()
        .expanded_forms(&code("en"), ExpansionMode::Chaos)
        .unwrap();

    assert_eq!(*fresh, *cached);
}

#[test]
fn clear_cache_is_scoped_and_forgets_memoized_state() {
    let fixture = Fixture::new();
    let engine = fixture.engine();
    engine
        .solutions(&code("fr"), 5, Difficulty::Medium, Filtering::Enabled)
        .unwrap();
    engine
        .solutions(&code("en"), 5, Difficulty::Medium, Filtering::Enabled)
        .unwrap();

    let removed = engine
        .clear_cache(&CacheScope::Language(code("fr")))
        .unwrap();
    assert_eq!(removed, 2);
    assert_eq!(count_records(&fixture.path("cache/fr")), 0);
    assert_eq!(count_records(&fixture.path("cache/en")), 2);

    fixture.write("dictionaries/fr/index.dic", "1\nplume\n");
    let pool = engine
        .solutions(&code("fr"), 5, Difficulty::Medium, Filtering::Enabled)
        .unwrap();
    assert_eq!(words(&pool), vec!["plume"]);

    assert_eq!(engine.clear_cache(&CacheScope::All).unwrap(), 4);
}

#[test]
fn engine_without_cache_still_serves_requests() {
    let fixture = Fixture::new();
    let engine = fixture.engine_without_cache();

    let pool = engine
        .solutions(&code("fr"), 5, Difficulty::Medium, Filtering::Enabled)
        .unwrap();

    assert_eq!(pool.len(), 3);
    assert_eq!(engine.clear_cache(&CacheScope::All).unwrap(), 0);
    assert!(!fixture.path("cache").exists());
}

#[test]
fn concurrent_requests_share_one_build() {
    let fixture = Fixture::new();
    let engine = &fixture.engine_without_cache();

    let built: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(move || {
                    engine
                        .expanded_forms(&code("fr"), ExpansionMode::Restricted)
                        .unwrap()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    assert!(built.iter().all(|forms| Arc::ptr_eq(forms, &built[0])));
    let sources: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(move || engine.source(&code("fr")).unwrap()))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });
    assert!(sources.iter().all(|raw| Arc::ptr_eq(raw, &sources[0])));
}

#[test]
fn prepare_handles_a_repeated_language() {
    let fixture = Fixture::new();
    let engine = fixture.engine_without_cache();

    let results = engine.prepare(&[code("fr"), code("fr"), code("fr")], Difficulty::Hard);

    assert!(results
        .iter()
        .all(|(language, forms)| *language == code("fr") && *forms.as_ref().unwrap() == 6));
    let memoized = engine
        .expanded_forms(&code("fr"), ExpansionMode::Restricted)
        .unwrap();
    let again = engine
        .expanded_forms(&code("fr"), ExpansionMode::Restricted)
        .unwrap();
    assert!(Arc::ptr_eq(&memoized, &again));
}

#[test]
fn prepare_expands_languages_in_parallel() {
    let fixture = Fixture::new();
    let engine = fixture.engine();

    let results = engine.prepare(&[code("en"), code("fr"), code("xx")], Difficulty::Hard);

    assert_eq!(results.len(), 3);
    assert_eq!(results[1].0, code("fr"));
    assert_eq!(*results[1].1.as_ref().unwrap(), 6);
    assert!(results[0].1.is_ok());
    assert!(results[2].1.is_err());
    assert_eq!(count_records(&fixture.path("cache/en")), 1);
}
