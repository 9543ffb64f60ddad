//! Language-specific metadata for validation and curation.
//!
//! Keyed by archetype (the primary language subtag), so `de-at` and `de-ch`
//! share the German entries.

/// Spellings a guess may be rewritten to when it is not found as typed.
///
/// Returns `None` if the language has no alternative spellings.
pub fn transliterations(lang: &str) -> Option<&'static [(char, &'static str)]> {
    match lang {
        "de" | "lb" => Some(&[('ä', "ae"), ('ö', "oe"), ('ü', "ue"), ('ß', "ss")]),
        "da" | "nb" | "nn" | "no" => Some(&[('æ', "ae"), ('ø', "oe"), ('å', "aa")]),
        _ => None,
    }
}

/// Whether the language capitalizes common nouns, which makes
/// capitalization useless for spotting proper nouns.
pub fn capitalizes_common_nouns(lang: &str) -> bool {
    matches!(lang, "de" | "lb")
}

/// Rewrite `word` using the language's alternative spellings.
///
/// Returns `None` when the language has none or the word contains none of
/// the rewritten characters.
pub fn transliterate(lang: &str, word: &str) -> Option<String> {
    let table = transliterations(lang)?;
    if !word.chars().any(|c| table.iter().any(|(from, _)| *from == c)) {
        return None;
    }
    Some(
        word.chars()
            .map(|c| {
                table
                    .iter()
                    .find(|(from, _)| *from == c)
                    .map_or_else(|| c.to_string(), |(_, to)| (*to).to_string())
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn german_umlauts_are_spelled_out() {
        assert_eq!(transliterate("de", "grüße").as_deref(), Some("gruesse"));
    }

    #[test]
    fn words_without_special_letters_are_left_alone() {
        assert_eq!(transliterate("de", "haus"), None);
    }

    #[test]
    fn languages_without_table_return_none() {
        assert_eq!(transliterate("fr", "été"), None);
        assert!(transliterations("en").is_none());
    }
}
