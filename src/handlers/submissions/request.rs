//! Submission request DTOs

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::TestCase;

/// Submit code request
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitRequest {
    pub match_id: Uuid,

    pub player_id: Uuid,

    /// Source code
    #[validate(length(min = 1, max = 65536))] // 64KB max
    pub code: String,

    /// Programming language
    #[validate(length(min = 1, max = 20))]
    pub language: String,

    /// `{input, output}` pairs
    #[validate(length(min = 1, max = 100))]
    pub test_cases: Vec<TestCase>,
}
