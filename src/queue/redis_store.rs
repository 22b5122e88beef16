//! Redis queue store
//!
//! Every partition is a sorted set of JSON-encoded entries scored by a
//! per-partition sequence counter. Mutations run as Lua scripts, which Redis
//! executes without interleaving other commands, so a pair-pop can never hand
//! the same entry to two callers.

use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::Utc;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};
use uuid::Uuid;

use super::{DuplicateJoinPolicy, Partition, QueueEntry, QueueStore};
use crate::constants::redis_keys;
use crate::error::AppResult;

/// KEYS: queue, sequence. ARGV: entry_id, user_id, difficulty, language,
/// joined_at, replace flag. Returns the stored entry.
static ENQUEUE: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r#"
local seq = redis.call('INCR', KEYS[2])
if ARGV[6] == '1' then
    for _, member in ipairs(redis.call('ZRANGE', KEYS[1], 0, -1)) do
        if cjson.decode(member).user_id == ARGV[2] then
            redis.call('ZREM', KEYS[1], member)
        end
    end
end
local entry = cjson.encode({
    entry_id = ARGV[1],
    user_id = ARGV[2],
    difficulty = ARGV[3],
    language = ARGV[4],
    enqueued_at = seq,
    joined_at = ARGV[5],
})
redis.call('ZADD', KEYS[1], seq, entry)
return entry
"#,
    )
});

/// KEYS: queue. Returns nil or the two popped entries, oldest first.
static DEQUEUE_PAIR: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r#"
local members = redis.call('ZRANGE', KEYS[1], 0, -1)
if #members < 2 then
    return false
end
local first = members[1]
local first_user = cjson.decode(first).user_id
for i = 2, #members do
    if cjson.decode(members[i]).user_id ~= first_user then
        redis.call('ZREM', KEYS[1], first, members[i])
        return {first, members[i]}
    end
end
return false
"#,
    )
});

/// KEYS: queue. ARGV: user_id. Returns the number of removed entries.
static REMOVE_USER: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r#"
local removed = 0
for _, member in ipairs(redis.call('ZRANGE', KEYS[1], 0, -1)) do
    if cjson.decode(member).user_id == ARGV[1] then
        removed = removed + redis.call('ZREM', KEYS[1], member)
    end
end
return removed
"#,
    )
});

/// Queue store shared by every server instance through Redis
#[derive(Clone)]
pub struct RedisQueueStore {
    redis: ConnectionManager,
    policy: DuplicateJoinPolicy,
}

impl RedisQueueStore {
    pub fn new(redis: ConnectionManager, policy: DuplicateJoinPolicy) -> Self {
        Self { redis, policy }
    }

    fn sequence_key(partition: &Partition) -> String {
        format!("{}:{}", partition.key(), redis_keys::SEQUENCE_SUFFIX)
    }
}

#[async_trait]
impl QueueStore for RedisQueueStore {
    async fn enqueue(&self, partition: &Partition, user_id: Uuid) -> AppResult<QueueEntry> {
        let mut conn = self.redis.clone();
        let replace = self.policy == DuplicateJoinPolicy::Replace;

        let raw: String = ENQUEUE
            .key(partition.key())
            .key(Self::sequence_key(partition))
            .arg(Uuid::new_v4().to_string())
            .arg(user_id.to_string())
            .arg(partition.difficulty.as_str())
            .arg(partition.language.as_str())
            .arg(Utc::now().to_rfc3339())
            .arg(if replace { "1" } else { "0" })
            .invoke_async(&mut conn)
            .await?;

        Ok(serde_json::from_str(&raw)?)
    }

    async fn dequeue_pair(
        &self,
        partition: &Partition,
    ) -> AppResult<Option<(QueueEntry, QueueEntry)>> {
        let mut conn = self.redis.clone();

        let popped: Option<Vec<String>> = DEQUEUE_PAIR
            .key(partition.key())
            .invoke_async(&mut conn)
            .await?;

        match popped.as_deref() {
            Some([first, second]) => Ok(Some((
                serde_json::from_str(first)?,
                serde_json::from_str(second)?,
            ))),
            _ => Ok(None),
        }
    }

    async fn size(&self, partition: &Partition) -> AppResult<u64> {
        let mut conn = self.redis.clone();
        let size: u64 = conn.zcard(partition.key()).await?;
        Ok(size)
    }

    async fn remove_by_identity(&self, partition: &Partition, user_id: Uuid) -> AppResult<u64> {
        let mut conn = self.redis.clone();
        let removed: u64 = REMOVE_USER
            .key(partition.key())
            .arg(user_id.to_string())
            .invoke_async(&mut conn)
            .await?;
        Ok(removed)
    }

    async fn restore(&self, partition: &Partition, entries: Vec<QueueEntry>) -> AppResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut pipe = redis::pipe();
        pipe.atomic();
        for entry in &entries {
            // Original scores put the entries back ahead of later joiners
            pipe.zadd(partition.key(), serde_json::to_string(entry)?, entry.enqueued_at)
                .ignore();
        }

        let mut conn = self.redis.clone();
        let (): () = pipe.query_async(&mut conn).await?;
        Ok(())
    }
}
