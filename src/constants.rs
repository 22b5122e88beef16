//! Application-wide constants
//!
//! This module contains all constant values used throughout the application.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// SERVER DEFAULTS
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// API base path
pub const API_BASE_PATH: &str = "/api/v1";

// =============================================================================
// DATABASE / REDIS DEFAULTS
// =============================================================================

/// Default maximum database connections in the pool
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 20;

/// Default Redis URL
pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";

// =============================================================================
// SANDBOX DEFAULTS
// =============================================================================

/// Default deadline for the compile (or syntax check) step
pub const DEFAULT_COMPILE_TIMEOUT_MS: u64 = 10_000;

/// Default deadline for a single test case run
pub const DEFAULT_RUN_TIMEOUT_MS: u64 = 2_000;

/// Default data segment ceiling for a submitted program
pub const DEFAULT_MEMORY_LIMIT_MB: u64 = 256;

/// Default cap on captured stdout per run
pub const DEFAULT_OUTPUT_LIMIT_KB: u64 = 1024;

/// Maximum length of compiler diagnostics kept on a submission
pub const MAX_DIAGNOSTIC_LENGTH: usize = 4000;

/// Default number of submissions judged concurrently
pub const DEFAULT_JUDGE_WORKERS: usize = 4;

// =============================================================================
// VALIDATION
// =============================================================================

/// Maximum source code size in bytes (64 KB)
pub const MAX_SOURCE_CODE_SIZE: usize = 64 * 1024;

/// Maximum number of test cases accepted with one submission
pub const MAX_TEST_CASES: usize = 100;

// =============================================================================
// SUPPORTED LANGUAGES
// =============================================================================

/// Language identifiers
pub mod languages {
    pub const GO: &str = "go";
    pub const PYTHON: &str = "python";
    pub const JAVASCRIPT: &str = "javascript";
    pub const CPP: &str = "cpp";
    pub const RUST: &str = "rust";

    /// All supported language identifiers
    pub const ALL: &[&str] = &[GO, PYTHON, JAVASCRIPT, CPP, RUST];
}

// =============================================================================
// MATCHMAKING
// =============================================================================

/// Difficulty identifiers
pub mod difficulties {
    pub const EASY: &str = "easy";
    pub const MEDIUM: &str = "medium";
    pub const HARD: &str = "hard";

    /// All difficulty identifiers
    pub const ALL: &[&str] = &[EASY, MEDIUM, HARD];
}

/// Match lifecycle statuses
pub mod match_statuses {
    pub const WAITING: &str = "waiting";
    pub const ACTIVE: &str = "active";
    pub const COMPLETED: &str = "completed";
}

/// Redis key layout
pub mod redis_keys {
    /// Prefix of every partition sorted set: `queue:{difficulty}:{language}`
    pub const QUEUE_PREFIX: &str = "queue";

    /// Suffix of the per-partition sequence counter
    pub const SEQUENCE_SUFFIX: &str = "seq";

    /// Prefix of room identifiers and their pub/sub channels
    pub const ROOM_PREFIX: &str = "room";
}

// =============================================================================
// SUBMISSION STATUSES
// =============================================================================

/// Submission statuses
pub mod submission_statuses {
    pub const PENDING: &str = "pending";
    pub const RUNNING: &str = "running";
    pub const PASSED: &str = "passed";
    pub const FAILED: &str = "failed";
    pub const ERROR: &str = "error";
    pub const TIMEOUT: &str = "timeout";
}
