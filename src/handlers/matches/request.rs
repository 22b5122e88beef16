//! Match request DTOs

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Join queue request
#[derive(Debug, Deserialize, Validate)]
pub struct JoinQueueRequest {
    pub user_id: Uuid,

    /// easy, medium or hard (default medium)
    #[validate(length(max = 16))]
    pub difficulty: Option<String>,

    /// Language tag (default go)
    #[validate(length(max = 16))]
    pub language: Option<String>,
}

/// Leave queue request
#[derive(Debug, Deserialize, Validate)]
pub struct LeaveQueueRequest {
    pub user_id: Uuid,

    #[validate(length(max = 16))]
    pub difficulty: Option<String>,

    #[validate(length(max = 16))]
    pub language: Option<String>,
}

/// Queue status query parameters
#[derive(Debug, Deserialize)]
pub struct QueueStatusQuery {
    pub difficulty: Option<String>,
    pub language: Option<String>,
}

/// Room acknowledgement
#[derive(Debug, Deserialize)]
pub struct ReadyRequest {
    pub player_id: Uuid,
}

/// Complete match request
#[derive(Debug, Deserialize, Validate)]
pub struct CompleteMatchRequest {
    pub winner_id: Option<Uuid>,

    #[validate(range(min = 0))]
    pub duration_seconds: i32,
}
