//! Room events
//!
//! Payloads announced to the two players of a match. Delivery to sockets is
//! someone else's job: events are published on the Redis channel named after
//! the room, and a publish failure never fails the operation that caused it.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{MatchSummary, SubmissionStatus};

/// Event published on a match room channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomEvent {
    MatchFound {
        room_id: String,
        #[serde(rename = "match")]
        summary: MatchSummary,
    },
    SubmissionResult {
        room_id: String,
        submission_id: Uuid,
        player_id: Uuid,
        status: SubmissionStatus,
        score: i32,
        runtime_ms: i64,
    },
}

impl RoomEvent {
    /// Channel the event is published on
    pub fn room_id(&self) -> &str {
        match self {
            Self::MatchFound { room_id, .. } | Self::SubmissionResult { room_id, .. } => room_id,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: RoomEvent) -> AppResult<()>;
}

/// Publishes events with Redis `PUBLISH`
#[derive(Clone)]
pub struct RedisEventPublisher {
    redis: ConnectionManager,
}

impl RedisEventPublisher {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl EventPublisher for RedisEventPublisher {
    async fn publish(&self, event: RoomEvent) -> AppResult<()> {
        let payload = serde_json::to_string(&event)?;
        let mut conn = self.redis.clone();
        let receivers: u64 = conn.publish(event.room_id(), payload).await?;
        tracing::debug!(room_id = event.room_id(), receivers, "Published room event");
        Ok(())
    }
}

/// Publish and log instead of failing the caller
pub async fn publish_or_log(publisher: &dyn EventPublisher, event: RoomEvent) {
    let room_id = event.room_id().to_string();
    if let Err(e) = publisher.publish(event).await {
        tracing::warn!(room_id = %room_id, error = %e, "Failed to publish room event");
    }
}
