//! Tests for guess validation.

use anyletters::{
    Dictionary, ExpansionConfig, FormExpander, LanguageCode, ValidationIndex, Verdict,
};

fn index(language: &str, aff: &str, dic: &str) -> ValidationIndex {
    let language = LanguageCode::new(language);
    let dictionary = Dictionary::from_texts(language.clone(), aff, dic).unwrap();
    let forms = FormExpander::new(&ExpansionConfig::restricted(), &language).expand(&dictionary);
    ValidationIndex::from_forms(&forms, &language)
}

fn english() -> ValidationIndex {
    index(
        "en",
        "SFX G Y 2\nSFX G e ing e\nSFX G 0 ing [^e]\n",
        "3\nbake/G\nrun/G\nParis\n",
    )
}

// =========================================================================
// Membership
// =========================================================================

#[test]
fn membership_is_case_insensitive() {
    let index = english();

    assert!(index.is_valid("baking", 6));
    assert!(index.is_valid("BAKING", 6));
    assert!(index.is_valid("Paris", 5));
    assert!(index.is_valid("  bake ", 4));
}

#[test]
fn unknown_words_are_rejected() {
    let index = english();

    assert_eq!(index.check("bakeing", 7), Verdict::Unknown);
    assert!(!index.is_valid("zzzz", 4));
}

#[test]
fn wrong_length_is_rejected_before_lookup() {
    let index = english();

    assert_eq!(
        index.check("bake", 5),
        Verdict::WrongLength {
            expected: 5,
            actual: 4
        }
    );
    assert!(!index.is_valid("baking", 5));
}

#[test]
fn decomposed_input_matches_composed_forms() {
    let index = index("fr", "", "1\ncafé\n");

    assert!(index.is_valid("cafe\u{301}", 4));
    assert!(index.is_valid("CAFÉ", 4));
}

#[test]
fn turkish_dotted_capital_lowercases_per_language() {
    let index = index("tr", "", "1\nistanbul\n");
    assert!(index.is_valid("İSTANBUL", 8));
}

// =========================================================================
// Extra Words and Transliteration
// =========================================================================

#[test]
fn extra_words_join_the_index() {
    let index = english().with_words(["Zebra", "quartz"]);

    assert!(index.is_valid("zebra", 5));
    assert!(index.is_valid("QUARTZ", 6));
    assert_eq!(index.len_of(5), 2);
}

#[test]
fn german_guesses_retry_with_spelled_out_umlauts() {
    let index = index("de-ch", "", "2\nStrasse\nHaus\n");

    assert!(index.is_valid("Strasse", 7));
    assert!(index.is_valid("straße", 6));
    assert!(!index.is_valid("häus", 4));
}

#[test]
fn transliteration_is_language_specific() {
    let index = index("en", "", "1\nstrasse\n");
    assert!(!index.is_valid("straße", 6));
}

// =========================================================================
// Length Queries
// =========================================================================

#[test]
fn words_are_listed_per_length() {
    let index = english();

    let mut six: Vec<&str> = index.all_of_length(6).collect();
    six.sort_unstable();
    assert_eq!(six, vec!["baking", "runing"]);
    assert_eq!(index.len_of(3), 1);
    assert_eq!(index.len_of(9), 0);
    assert_eq!(index.lengths(), vec![3, 4, 5, 6]);
}
