//! Match response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Match, MatchDetails};

/// Match response
#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub id: Uuid,
    pub room_id: String,
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

impl From<Match> for MatchResponse {
    fn from(m: Match) -> Self {
        Self {
            room_id: m.room_id(),
            id: m.id,
            player1_id: m.player1_id,
            player2_id: m.player2_id,
            problem_id: m.problem_id,
            status: m.status,
            winner_id: m.winner_id,
            duration_seconds: m.duration_seconds,
            player1_ready: m.player1_ready,
            player2_ready: m.player2_ready,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Match status with denormalized names
#[derive(Debug, Serialize)]
pub struct MatchStatusResponse {
    #[serde(flatten)]
    pub record: MatchResponse,
    pub player1_username: Option<String>,
    pub player2_username: Option<String>,
    pub problem_title: Option<String>,
}

impl From<MatchDetails> for MatchStatusResponse {
    fn from(details: MatchDetails) -> Self {
        Self {
            record: details.record.into(),
            player1_username: details.player1_username,
            player2_username: details.player2_username,
            problem_title: details.problem_title,
        }
    }
}

/// Leave queue response
#[derive(Debug, Serialize)]
pub struct LeaveQueueResponse {
    pub removed: u64,
}
