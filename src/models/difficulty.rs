//! Problem difficulty

use serde::{Deserialize, Serialize};

use crate::constants::difficulties;

/// Difficulty tier a player queues for
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Get difficulty as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => difficulties::EASY,
            Self::Medium => difficulties::MEDIUM,
            Self::Hard => difficulties::HARD,
        }
    }

    /// Parse difficulty from string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            difficulties::EASY => Some(Self::Easy),
            difficulties::MEDIUM => Some(Self::Medium),
            difficulties::HARD => Some(Self::Hard),
            _ => None,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
