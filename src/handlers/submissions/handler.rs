//! Submission handler implementations

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    services::{JudgeReport, SubmitCode},
    state::AppState,
};

use super::{
    request::SubmitRequest,
    response::{MatchSubmissionsResponse, SubmissionResponse},
};

/// Judge code for a match. Blocks until judging is over.
pub async fn submit(
    State(state): State<AppState>,
    Json(payload): Json<SubmitRequest>,
) -> AppResult<Json<JudgeReport>> {
    payload.validate()?;

    let report = state
        .judge()
        .submit(SubmitCode {
            match_id: payload.match_id,
            player_id: payload.player_id,
            code: payload.code,
            language: payload.language,
            test_cases: payload.test_cases,
        })
        .await?;

    Ok(Json(report))
}

/// Get submission by ID
pub async fn get_submission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SubmissionResponse>> {
    let submission = state.judge().get_submission(id).await?;
    Ok(Json(submission.into()))
}

/// List the submissions of a match
pub async fn list_match_submissions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MatchSubmissionsResponse>> {
    let submissions = state.judge().get_by_match(id).await?;

    Ok(Json(MatchSubmissionsResponse {
        match_id: id,
        submissions: submissions.into_iter().map(Into::into).collect(),
    }))
}
