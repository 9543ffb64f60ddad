use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Game difficulty chosen by the controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Chaos,
}

/// Whether the controller may reveal part of the secret word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealPolicy {
    None,
    /// One letter of the secret is shown at the start of a round.
    OneLetter,
}

/// How far stems are expanded through the affix grammar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionMode {
    /// Bare stems and single-affix forms.
    #[default]
    Restricted,
    /// Every form the grammar can generate, including prefix and suffix
    /// cross products.
    Chaos,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Chaos,
    ];

    pub fn reveal_policy(self) -> RevealPolicy {
        match self {
            Difficulty::Easy => RevealPolicy::OneLetter,
            Difficulty::Medium | Difficulty::Hard | Difficulty::Chaos => RevealPolicy::None,
        }
    }

    pub fn expansion_mode(self) -> ExpansionMode {
        match self {
            Difficulty::Easy | Difficulty::Medium | Difficulty::Hard => ExpansionMode::Restricted,
            Difficulty::Chaos => ExpansionMode::Chaos,
        }
    }

    /// Chaos rounds draw secrets from the raw form closure.
    pub fn filters_solutions(self) -> bool {
        self != Difficulty::Chaos
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Chaos => "chaos",
        }
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Error returned when a difficulty name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown difficulty '{0}', expected one of: easy, medium, hard, chaos")]
pub struct DifficultyParseError(pub String);

impl FromStr for Difficulty {
    type Err = DifficultyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DifficultyParseError(s.to_string()))
    }
}
