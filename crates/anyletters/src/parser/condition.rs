//! Affix rule conditions.
//!
//! A condition is a tiny regular expression made of literal characters,
//! `.` wildcards and bracket classes (`[aeiou]`, `[^aeiou]`). It is matched
//! against the end of the stem for suffixes and the start for prefixes.

use winnow::combinator::{alt, delimited, opt, repeat};
use winnow::prelude::*;
use winnow::token::{none_of, take_till};

#[derive(Debug, Clone, PartialEq, Eq)]
enum CharClass {
    Any,
    Literal(char),
    OneOf(Vec<char>),
    NoneOf(Vec<char>),
}

impl CharClass {
    fn matches(&self, c: char) -> bool {
        match self {
            CharClass::Any => true,
            CharClass::Literal(expected) => *expected == c,
            CharClass::OneOf(set) => set.contains(&c),
            CharClass::NoneOf(set) => !set.contains(&c),
        }
    }
}

/// A parsed affix condition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Condition {
    classes: Vec<CharClass>,
}

impl Condition {
    /// Parse a condition field. A lone `.` is the empty condition.
    pub fn parse(input: &str) -> Result<Self, String> {
        if input == "." {
            return Ok(Self::default());
        }
        let mut remaining = input;
        match condition(&mut remaining) {
            Ok(classes) if remaining.is_empty() => Ok(Self { classes }),
            Ok(_) => Err(format!("unexpected '{remaining}' in condition '{input}'")),
            Err(e) => Err(format!("invalid condition '{input}': {e}")),
        }
    }

    /// True when the condition places no constraint on the stem.
    pub fn is_unconditional(&self) -> bool {
        self.classes.is_empty()
    }

    /// Whether the last characters of `word` satisfy the condition.
    pub fn matches_end(&self, word: &str) -> bool {
        let mut chars = word.chars().rev();
        self.classes
            .iter()
            .rev()
            .all(|class| chars.next().is_some_and(|c| class.matches(c)))
    }

    /// Whether the first characters of `word` satisfy the condition.
    pub fn matches_start(&self, word: &str) -> bool {
        let mut chars = word.chars();
        self.classes
            .iter()
            .all(|class| chars.next().is_some_and(|c| class.matches(c)))
    }
}

fn condition(input: &mut &str) -> ModalResult<Vec<CharClass>> {
    repeat(1.., char_class).parse_next(input)
}

fn char_class(input: &mut &str) -> ModalResult<CharClass> {
    alt((
        bracket_class,
        '.'.value(CharClass::Any),
        none_of(['[', ']']).map(CharClass::Literal),
    ))
    .parse_next(input)
}

fn bracket_class(input: &mut &str) -> ModalResult<CharClass> {
    let (negated, body): (Option<char>, &str) =
        delimited('[', (opt('^'), take_till(1.., ']')), ']').parse_next(input)?;
    let chars = body.chars().collect();
    Ok(if negated.is_some() {
        CharClass::NoneOf(chars)
    } else {
        CharClass::OneOf(chars)
    })
}
