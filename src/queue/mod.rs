//! Matchmaking queue
//!
//! Waiting players are kept in FIFO order, one queue per
//! (difficulty, language) partition. Partitions never interact.

pub mod memory;
pub mod redis_store;

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::redis_keys;
use crate::error::AppResult;
use crate::models::Difficulty;
use crate::sandbox::Language;

pub use memory::MemoryQueueStore;
pub use redis_store::RedisQueueStore;

/// One independent queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Partition {
    pub difficulty: Difficulty,
    pub language: Language,
}

impl Partition {
    pub fn new(difficulty: Difficulty, language: Language) -> Self {
        Self {
            difficulty,
            language,
        }
    }

    /// Storage key: `queue:{difficulty}:{language}`
    pub fn key(&self) -> String {
        format!(
            "{}:{}:{}",
            redis_keys::QUEUE_PREFIX,
            self.difficulty,
            self.language
        )
    }
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key())
    }
}

/// A waiting player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    /// Unique per enqueue, so duplicate joins stay distinguishable
    pub entry_id: Uuid,
    pub user_id: Uuid,
    pub difficulty: Difficulty,
    pub language: Language,
    /// Logical timestamp: position in the store's insertion sequence
    pub enqueued_at: u64,
    /// Wall-clock join time, informational only
    pub joined_at: DateTime<Utc>,
}

impl QueueEntry {
    pub fn partition(&self) -> Partition {
        Partition::new(self.difficulty, self.language)
    }
}

/// What happens to a user's older entries when they join the same partition again
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateJoinPolicy {
    /// Entries coexist; a user is still never paired with themselves
    #[default]
    Coexist,
    /// Older entries of the user are dropped together with the insertion
    Replace,
}

impl FromStr for DuplicateJoinPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "coexist" => Ok(Self::Coexist),
            "replace" => Ok(Self::Replace),
            _ => Err(()),
        }
    }
}

/// Partitioned FIFO queue with an atomic pair-pop
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Append a new entry for `user_id` and return it
    async fn enqueue(&self, partition: &Partition, user_id: Uuid) -> AppResult<QueueEntry>;

    /// Atomically remove the oldest entry and the oldest later entry of a
    /// different user. `None` when no such pair exists.
    async fn dequeue_pair(&self, partition: &Partition)
        -> AppResult<Option<(QueueEntry, QueueEntry)>>;

    /// Number of waiting entries
    async fn size(&self, partition: &Partition) -> AppResult<u64>;

    /// Remove every entry of `user_id`; returns how many were removed
    async fn remove_by_identity(&self, partition: &Partition, user_id: Uuid) -> AppResult<u64>;

    /// Put popped entries back at their original positions
    async fn restore(&self, partition: &Partition, entries: Vec<QueueEntry>) -> AppResult<()>;
}
