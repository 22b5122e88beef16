//! Match model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::constants::{match_statuses, redis_keys};

/// Match database model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Match {
    pub id: Uuid,
    pub player1_id: Uuid,
    pub player2_id: Uuid,
    pub problem_id: Option<Uuid>,
    pub status: String,
    pub winner_id: Option<Uuid>,
    pub duration_seconds: i32,
    pub player1_ready: bool,
    pub player2_ready: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Match {
    /// Room identifier derived from the match id
    pub fn room_id(&self) -> String {
        room_id_for(&self.id)
    }

    /// Check whether the user plays in this match
    pub fn has_player(&self, user_id: &Uuid) -> bool {
        self.player1_id == *user_id || self.player2_id == *user_id
    }

    /// Parsed lifecycle status
    pub fn match_status(&self) -> Option<MatchStatus> {
        MatchStatus::from_str(&self.status)
    }

    /// Check if the match reached its terminal state
    pub fn is_completed(&self) -> bool {
        self.match_status() == Some(MatchStatus::Completed)
    }

    /// Summary announced to both players when the match is created
    pub fn summary(&self) -> MatchSummary {
        MatchSummary {
            match_id: self.id,
            player1_id: self.player1_id,
            player2_id: self.player2_id,
            problem_id: self.problem_id,
            room_id: self.room_id(),
        }
    }
}

/// Room identifier for a match id
pub fn room_id_for(match_id: &Uuid) -> String {
    format!("{}:{}", redis_keys::ROOM_PREFIX, match_id)
}

/// Match lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Waiting,
    Active,
    Completed,
}

impl MatchStatus {
    /// Get status as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => match_statuses::WAITING,
            Self::Active => match_statuses::ACTIVE,
            Self::Completed => match_statuses::COMPLETED,
        }
    }

    /// Parse status from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            match_statuses::WAITING => Some(Self::Waiting),
            match_statuses::ACTIVE => Some(Self::Active),
            match_statuses::COMPLETED => Some(Self::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pairing result returned to the joining player and broadcast to the room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub match_id: Uuid,
    pub player1_id: Uuid,
    pub player2_id: Uuid,
    pub problem_id: Option<Uuid>,
    pub room_id: String,
}

/// Match joined with player and problem info
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MatchDetails {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub record: Match,
    pub player1_username: Option<String>,
    pub player2_username: Option<String>,
    pub problem_title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Match {
        let now = Utc::now();
        Match {
            id: Uuid::new_v4(),
            player1_id: Uuid::new_v4(),
            player2_id: Uuid::new_v4(),
            problem_id: None,
            status: match_statuses::WAITING.to_string(),
            winner_id: None,
            duration_seconds: 0,
            player1_ready: false,
            player2_ready: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_room_id_is_derived_from_match_id() {
        let m = sample();
        assert_eq!(m.room_id(), format!("room:{}", m.id));
        assert_eq!(m.summary().room_id, m.room_id());
    }

    #[test]
    fn test_has_player() {
        let m = sample();
        assert!(m.has_player(&m.player1_id));
        assert!(m.has_player(&m.player2_id));
        assert!(!m.has_player(&Uuid::new_v4()));
    }

    #[test]
    fn test_status_round_trip() {
        let mut m = sample();
        assert_eq!(m.match_status(), Some(MatchStatus::Waiting));
        assert!(!m.is_completed());
        m.status = MatchStatus::Completed.as_str().to_string();
        assert!(m.is_completed());
        assert_eq!(MatchStatus::from_str("paused"), None);
    }
}
