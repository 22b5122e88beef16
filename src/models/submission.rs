//! Submission model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::constants::submission_statuses;

/// Submission database model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub match_id: Uuid,
    pub player_id: Uuid,
    #[serde(skip_serializing)]
    pub code: String,
    pub language: String,
    pub status: String,
    pub score: i32,
    pub runtime_ms: i64,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub judged_at: Option<DateTime<Utc>>,
}

/// Values needed to create a submission row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubmission {
    pub match_id: Uuid,
    pub player_id: Uuid,
    pub code: String,
    pub language: String,
    pub status: SubmissionStatus,
}

/// Terminal values written once judging is over
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub status: SubmissionStatus,
    pub score: i32,
    pub runtime_ms: i64,
    pub error_message: Option<String>,
}

/// Submission status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Running,
    Passed,
    Failed,
    Error,
    Timeout,
}

impl SubmissionStatus {
    /// Get status as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => submission_statuses::PENDING,
            Self::Running => submission_statuses::RUNNING,
            Self::Passed => submission_statuses::PASSED,
            Self::Failed => submission_statuses::FAILED,
            Self::Error => submission_statuses::ERROR,
            Self::Timeout => submission_statuses::TIMEOUT,
        }
    }

    /// Parse status from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            submission_statuses::PENDING => Some(Self::Pending),
            submission_statuses::RUNNING => Some(Self::Running),
            submission_statuses::PASSED => Some(Self::Passed),
            submission_statuses::FAILED => Some(Self::Failed),
            submission_statuses::ERROR => Some(Self::Error),
            submission_statuses::TIMEOUT => Some(Self::Timeout),
            _ => None,
        }
    }

    /// Check if this is a terminal status (judging complete)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::Running)
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
