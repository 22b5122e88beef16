//! In-process queue store
//!
//! Each partition is a `VecDeque` behind its own async mutex, so pairing on
//! one partition never waits on another. Only correct for a single server
//! instance.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{DuplicateJoinPolicy, Partition, QueueEntry, QueueStore};
use crate::error::AppResult;

type PartitionQueue = Arc<Mutex<VecDeque<QueueEntry>>>;

/// Queue store kept in process memory
#[derive(Debug, Default)]
pub struct MemoryQueueStore {
    partitions: Mutex<HashMap<Partition, PartitionQueue>>,
    sequence: AtomicU64,
    policy: DuplicateJoinPolicy,
}

impl MemoryQueueStore {
    pub fn new(policy: DuplicateJoinPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    async fn partition(&self, partition: &Partition) -> PartitionQueue {
        let mut partitions = self.partitions.lock().await;
        partitions.entry(*partition).or_default().clone()
    }
}

#[async_trait]
impl QueueStore for MemoryQueueStore {
    async fn enqueue(&self, partition: &Partition, user_id: Uuid) -> AppResult<QueueEntry> {
        let queue = self.partition(partition).await;
        let mut queue = queue.lock().await;

        if self.policy == DuplicateJoinPolicy::Replace {
            queue.retain(|e| e.user_id != user_id);
        }

        // Sequence is taken under the partition lock so queue order matches it
        let entry = QueueEntry {
            entry_id: Uuid::new_v4(),
            user_id,
            difficulty: partition.difficulty,
            language: partition.language,
            enqueued_at: self.sequence.fetch_add(1, Ordering::SeqCst) + 1,
            joined_at: Utc::now(),
        };
        queue.push_back(entry.clone());
        Ok(entry)
    }

    async fn dequeue_pair(
        &self,
        partition: &Partition,
    ) -> AppResult<Option<(QueueEntry, QueueEntry)>> {
        let queue = self.partition(partition).await;
        let mut queue = queue.lock().await;

        let Some(first_user) = queue.front().map(|e| e.user_id) else {
            return Ok(None);
        };
        let Some(index) = queue.iter().skip(1).position(|e| e.user_id != first_user) else {
            return Ok(None);
        };

        // position() counts from the second element
        let second = queue.remove(index + 1);
        let first = queue.pop_front();
        Ok(first.zip(second))
    }

    async fn size(&self, partition: &Partition) -> AppResult<u64> {
        let queue = self.partition(partition).await;
        let len = queue.lock().await.len();
        Ok(len as u64)
    }

    async fn remove_by_identity(&self, partition: &Partition, user_id: Uuid) -> AppResult<u64> {
        let queue = self.partition(partition).await;
        let mut queue = queue.lock().await;
        let before = queue.len();
        queue.retain(|e| e.user_id != user_id);
        Ok((before - queue.len()) as u64)
    }

    async fn restore(&self, partition: &Partition, entries: Vec<QueueEntry>) -> AppResult<()> {
        let queue = self.partition(partition).await;
        let mut queue = queue.lock().await;
        for entry in entries {
            let at = queue.partition_point(|e| e.enqueued_at < entry.enqueued_at);
            queue.insert(at, entry);
        }
        Ok(())
    }
}
