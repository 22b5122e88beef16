//! Match service: queue membership, pairing and the match lifecycle

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    db::repositories::{MatchStore, ProblemCatalog},
    error::{AppError, AppResult},
    events::{publish_or_log, EventPublisher, RoomEvent},
    models::{Difficulty, Match, MatchDetails, MatchSummary},
    queue::{Partition, QueueEntry, QueueStore},
    sandbox::Language,
    utils::{difficulty_or_default, language_or_default, validate_identity},
};

/// Result of a join request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JoinOutcome {
    /// Waiting for an opponent
    Queued,
    /// A pair was formed and a match created
    Matched {
        #[serde(rename = "match")]
        summary: MatchSummary,
    },
}

/// Queue size of one partition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueStatus {
    pub difficulty: Difficulty,
    pub language: Language,
    pub queue_size: u64,
}

/// Matchmaking and match lifecycle
pub struct MatchService {
    queue: Arc<dyn QueueStore>,
    matches: Arc<dyn MatchStore>,
    problems: Arc<dyn ProblemCatalog>,
    events: Arc<dyn EventPublisher>,
    /// Entries popped for a pairing whose match is not written yet
    in_flight: Mutex<HashMap<Uuid, InFlight>>,
}

#[derive(Debug)]
struct InFlight {
    partition: Partition,
    user_id: Uuid,
    left: bool,
}

impl MatchService {
    pub fn new(
        queue: Arc<dyn QueueStore>,
        matches: Arc<dyn MatchStore>,
        problems: Arc<dyn ProblemCatalog>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            queue,
            matches,
            problems,
            events,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Enqueue the user, then try to form a pair in the same partition.
    ///
    /// Missing or blank difficulty/language fall back to `medium`/`go`.
    pub async fn join(
        &self,
        user_id: Uuid,
        difficulty: Option<&str>,
        language: Option<&str>,
    ) -> AppResult<JoinOutcome> {
        validate_identity(&user_id).map_err(|e| AppError::Validation(e.to_string()))?;
        let partition = Partition::new(
            difficulty_or_default(difficulty)?,
            language_or_default(language)?,
        );

        let entry = self.queue.enqueue(&partition, user_id).await?;
        tracing::info!(
            user_id = %user_id,
            partition = %partition,
            entry_id = %entry.entry_id,
            "Player joined queue"
        );

        let (first, second) = {
            // Held across the pop so a concurrent leave sees the entries
            let mut in_flight = self.in_flight.lock().await;
            let Some((first, second)) = self.queue.dequeue_pair(&partition).await? else {
                return Ok(JoinOutcome::Queued);
            };
            for entry in [&first, &second] {
                in_flight.insert(
                    entry.entry_id,
                    InFlight {
                        partition,
                        user_id: entry.user_id,
                        left: false,
                    },
                );
            }
            (first, second)
        };

        let created = self.create_match(&partition, &first, &second).await;
        let departed = self.settle(&[first.entry_id, second.entry_id]).await;

        let record = match created {
            Ok(record) => record,
            Err(e) => {
                // Popped players go back to their old positions unless they left meanwhile
                let returning: Vec<QueueEntry> = [first, second]
                    .into_iter()
                    .filter(|entry| !departed.contains(&entry.entry_id))
                    .collect();
                if let Err(restore_err) = self.queue.restore(&partition, returning).await {
                    tracing::error!(
                        partition = %partition,
                        error = %restore_err,
                        "Failed to restore queue entries after match creation failure"
                    );
                }
                return Err(e);
            }
        };

        let summary = record.summary();
        tracing::info!(
            match_id = %record.id,
            player1_id = %record.player1_id,
            player2_id = %record.player2_id,
            partition = %partition,
            "Match created"
        );

        publish_or_log(
            self.events.as_ref(),
            RoomEvent::MatchFound {
                room_id: summary.room_id.clone(),
                summary: summary.clone(),
            },
        )
        .await;

        Ok(JoinOutcome::Matched { summary })
    }

    /// Stop tracking popped entries; returns those whose player left meanwhile
    async fn settle(&self, entry_ids: &[Uuid]) -> Vec<Uuid> {
        let mut in_flight = self.in_flight.lock().await;
        entry_ids
            .iter()
            .filter(|id| in_flight.remove(id).is_some_and(|entry| entry.left))
            .copied()
            .collect()
    }

    async fn create_match(
        &self,
        partition: &Partition,
        first: &QueueEntry,
        second: &QueueEntry,
    ) -> AppResult<Match> {
        let problem_id = self
            .problems
            .random_problem(partition.difficulty, partition.language)
            .await?;
        if problem_id.is_none() {
            tracing::warn!(partition = %partition, "No problem available for partition");
        }

        self.matches
            .create(first.user_id, second.user_id, problem_id)
            .await
    }

    /// Remove all of the user's entries from a partition
    pub async fn leave(
        &self,
        user_id: Uuid,
        difficulty: Option<&str>,
        language: Option<&str>,
    ) -> AppResult<u64> {
        validate_identity(&user_id).map_err(|e| AppError::Validation(e.to_string()))?;
        let partition = Partition::new(
            difficulty_or_default(difficulty)?,
            language_or_default(language)?,
        );

        let mut in_flight = self.in_flight.lock().await;
        let mut removed = self.queue.remove_by_identity(&partition, user_id).await?;
        for entry in in_flight.values_mut() {
            if entry.partition == partition && entry.user_id == user_id && !entry.left {
                entry.left = true;
                removed += 1;
            }
        }
        drop(in_flight);

        tracing::info!(user_id = %user_id, partition = %partition, removed, "Player left queue");
        Ok(removed)
    }

    pub async fn queue_status(
        &self,
        difficulty: Option<&str>,
        language: Option<&str>,
    ) -> AppResult<QueueStatus> {
        let partition = Partition::new(
            difficulty_or_default(difficulty)?,
            language_or_default(language)?,
        );
        let queue_size = self.queue.size(&partition).await?;

        Ok(QueueStatus {
            difficulty: partition.difficulty,
            language: partition.language,
            queue_size,
        })
    }

    /// Match with player usernames and problem title
    pub async fn get_status(&self, match_id: Uuid) -> AppResult<MatchDetails> {
        self.matches
            .find_details(match_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Match not found".to_string()))
    }

    /// A player acknowledges the room; the match turns active once both have
    pub async fn acknowledge(&self, match_id: Uuid, player_id: Uuid) -> AppResult<Match> {
        let record = self.find_match(match_id).await?;
        if !record.has_player(&player_id) {
            return Err(AppError::Forbidden(
                "Player is not part of this match".to_string(),
            ));
        }
        if record.is_completed() {
            return Err(AppError::Conflict("Match is already completed".to_string()));
        }

        let record = self
            .matches
            .mark_ready(match_id, player_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Match not found".to_string()))?;

        tracing::info!(
            match_id = %match_id,
            player_id = %player_id,
            status = %record.status,
            "Player ready"
        );
        Ok(record)
    }

    /// Record the final result. Repeating identical values is a no-op;
    /// different values after completion are a conflict.
    pub async fn complete(
        &self,
        match_id: Uuid,
        winner_id: Option<Uuid>,
        duration_seconds: i32,
    ) -> AppResult<Match> {
        if duration_seconds < 0 {
            return Err(AppError::Validation(
                "duration_seconds cannot be negative".to_string(),
            ));
        }

        let record = self.find_match(match_id).await?;
        if let Some(winner) = winner_id {
            if !record.has_player(&winner) {
                return Err(AppError::Validation(
                    "Winner must be one of the match players".to_string(),
                ));
            }
        }

        let record = self
            .matches
            .complete(match_id, winner_id, duration_seconds)
            .await?
            .ok_or_else(|| {
                AppError::Conflict("Match was already completed with a different result".to_string())
            })?;

        tracing::info!(
            match_id = %match_id,
            winner_id = ?winner_id,
            duration_seconds,
            "Match completed"
        );
        Ok(record)
    }

    async fn find_match(&self, match_id: Uuid) -> AppResult<Match> {
        self.matches
            .find_by_id(match_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Match not found".to_string()))
    }
}
