//! Submission response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::Submission;

/// Stored submission
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub id: Uuid,
    pub match_id: Uuid,
    pub player_id: Uuid,
    pub language: String,
    pub status: String,
    pub score: i32,
    pub runtime_ms: i64,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub judged_at: Option<DateTime<Utc>>,
}

impl From<Submission> for SubmissionResponse {
    fn from(s: Submission) -> Self {
        Self {
            id: s.id,
            match_id: s.match_id,
            player_id: s.player_id,
            language: s.language,
            status: s.status,
            score: s.score,
            runtime_ms: s.runtime_ms,
            error_message: s.error_message,
            created_at: s.created_at,
            judged_at: s.judged_at,
        }
    }
}

/// Submissions of one match
#[derive(Debug, Serialize)]
pub struct MatchSubmissionsResponse {
    pub match_id: Uuid,
    pub submissions: Vec<SubmissionResponse>,
}
