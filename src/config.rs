//! Application configuration management
//!
//! This module handles loading and validating configuration from environment variables.
//! All configuration is loaded at startup and validated before the application runs.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_COMPILE_TIMEOUT_MS, DEFAULT_DATABASE_MAX_CONNECTIONS, DEFAULT_JUDGE_WORKERS,
    DEFAULT_MEMORY_LIMIT_MB, DEFAULT_OUTPUT_LIMIT_KB, DEFAULT_REDIS_URL, DEFAULT_RUN_TIMEOUT_MS,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
};
use crate::queue::DuplicateJoinPolicy;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub queue: QueueConfig,
    pub sandbox: SandboxConfig,
    pub judge: JudgeConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    pub log_format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
}

/// Where the matchmaking queue lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueBackend {
    /// Sorted sets in Redis, shared by every server instance
    Redis,
    /// Process-local queue, only correct with a single server instance
    Memory,
}

/// Matchmaking queue configuration
#[derive(Debug, Clone)]
pub struct QueueConfig {
    pub backend: QueueBackend,
    pub duplicate_policy: DuplicateJoinPolicy,
}

/// Limits applied to every compile and run step
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    pub compile_timeout_ms: u64,
    pub run_timeout_ms: u64,
    pub memory_limit_mb: u64,
    pub output_limit_kb: u64,
    /// Parent directory for per-submission work areas (system temp dir when unset)
    pub work_dir: Option<PathBuf>,
}

/// Judge worker pool configuration
#[derive(Debug, Clone)]
pub struct JudgeConfig {
    /// Number of submissions compiled/executed at the same time
    pub workers: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            redis: RedisConfig::from_env(),
            queue: QueueConfig::from_env()?,
            sandbox: SandboxConfig::from_env()?,
            judge: JudgeConfig::from_env()?,
        })
    }
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            port: parse_var("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            log_format: parse_var("LOG_FORMAT", LogFormat::Pretty)?,
        })
    }
}

impl DatabaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL".to_string()))?,
            max_connections: parse_var(
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_DATABASE_MAX_CONNECTIONS,
            )?,
        })
    }
}

impl RedisConfig {
    fn from_env() -> Self {
        Self {
            url: env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string()),
        }
    }
}

impl QueueConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            backend: parse_var("QUEUE_BACKEND", QueueBackend::Redis)?,
            duplicate_policy: parse_var("QUEUE_DUPLICATE_POLICY", DuplicateJoinPolicy::Coexist)?,
        })
    }
}

impl SandboxConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            compile_timeout_ms: parse_var("SANDBOX_COMPILE_TIMEOUT_MS", DEFAULT_COMPILE_TIMEOUT_MS)?,
            run_timeout_ms: parse_var("SANDBOX_RUN_TIMEOUT_MS", DEFAULT_RUN_TIMEOUT_MS)?,
            memory_limit_mb: parse_var("SANDBOX_MEMORY_LIMIT_MB", DEFAULT_MEMORY_LIMIT_MB)?,
            output_limit_kb: parse_var("SANDBOX_OUTPUT_LIMIT_KB", DEFAULT_OUTPUT_LIMIT_KB)?,
            work_dir: env::var("SANDBOX_WORK_DIR").ok().map(PathBuf::from),
        })
    }

    pub fn compile_timeout(&self) -> Duration {
        Duration::from_millis(self.compile_timeout_ms)
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_millis(self.run_timeout_ms)
    }
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            compile_timeout_ms: DEFAULT_COMPILE_TIMEOUT_MS,
            run_timeout_ms: DEFAULT_RUN_TIMEOUT_MS,
            memory_limit_mb: DEFAULT_MEMORY_LIMIT_MB,
            output_limit_kb: DEFAULT_OUTPUT_LIMIT_KB,
            work_dir: None,
        }
    }
}

impl JudgeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let workers = parse_var("JUDGE_WORKERS", DEFAULT_JUDGE_WORKERS)?;
        if workers == 0 {
            return Err(ConfigError::InvalidValue("JUDGE_WORKERS".to_string()));
        }
        Ok(Self { workers })
    }
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(()),
        }
    }
}

impl QueueBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Redis => "redis",
            Self::Memory => "memory",
        }
    }
}

impl FromStr for QueueBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            _ => Err(()),
        }
    }
}

/// Read `key` from the environment, falling back to `default` when unset.
fn parse_var<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        Err(_) => Ok(default),
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sandbox_defaults() {
        let sandbox = SandboxConfig::default();
        assert_eq!(sandbox.run_timeout(), Duration::from_secs(2));
        assert_eq!(sandbox.compile_timeout(), Duration::from_secs(10));
        assert_eq!(sandbox.memory_limit_mb, 256);
        assert!(sandbox.work_dir.is_none());
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("memory".parse::<QueueBackend>(), Ok(QueueBackend::Memory));
        assert!("sqlite".parse::<QueueBackend>().is_err());
    }

    #[test]
    fn test_unset_variable_uses_default() {
        let port: u16 = parse_var("CODEROULETTE_TEST_UNSET_PORT", 9000).unwrap();
        assert_eq!(port, 9000);
    }
}
