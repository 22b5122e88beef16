//! Match handler implementations

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    services::{JoinOutcome, QueueStatus},
    state::AppState,
};

use super::{
    request::{
        CompleteMatchRequest, JoinQueueRequest, LeaveQueueRequest, QueueStatusQuery, ReadyRequest,
    },
    response::{LeaveQueueResponse, MatchResponse, MatchStatusResponse},
};

/// Join the matchmaking queue
pub async fn join_queue(
    State(state): State<AppState>,
    Json(payload): Json<JoinQueueRequest>,
) -> AppResult<Json<JoinOutcome>> {
    payload.validate()?;

    let outcome = state
        .matches()
        .join(
            payload.user_id,
            payload.difficulty.as_deref(),
            payload.language.as_deref(),
        )
        .await?;

    Ok(Json(outcome))
}

/// Leave the matchmaking queue
pub async fn leave_queue(
    State(state): State<AppState>,
    Json(payload): Json<LeaveQueueRequest>,
) -> AppResult<Json<LeaveQueueResponse>> {
    payload.validate()?;

    let removed = state
        .matches()
        .leave(
            payload.user_id,
            payload.difficulty.as_deref(),
            payload.language.as_deref(),
        )
        .await?;

    Ok(Json(LeaveQueueResponse { removed }))
}

/// Number of players waiting in a partition
pub async fn queue_status(
    State(state): State<AppState>,
    Query(query): Query<QueueStatusQuery>,
) -> AppResult<Json<QueueStatus>> {
    let status = state
        .matches()
        .queue_status(query.difficulty.as_deref(), query.language.as_deref())
        .await?;

    Ok(Json(status))
}

/// Get match by ID
pub async fn get_match(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MatchStatusResponse>> {
    let details = state.matches().get_status(id).await?;
    Ok(Json(details.into()))
}

/// Acknowledge the match room
pub async fn ready(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReadyRequest>,
) -> AppResult<Json<MatchResponse>> {
    let record = state.matches().acknowledge(id, payload.player_id).await?;
    Ok(Json(record.into()))
}

/// Record the match result
pub async fn complete_match(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CompleteMatchRequest>,
) -> AppResult<Json<MatchResponse>> {
    payload.validate()?;

    let record = state
        .matches()
        .complete(id, payload.winner_id, payload.duration_seconds)
        .await?;

    Ok(Json(record.into()))
}
