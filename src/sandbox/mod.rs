//! Execution sandbox
//!
//! Compiles (or syntax checks) untrusted code and runs it against test cases
//! under a wall-clock deadline and resource ceilings.

pub mod executor;
pub mod languages;
pub mod runner;
pub mod verdict;

use async_trait::async_trait;

use crate::models::TestCase;

pub use languages::{Language, LanguageHandler};
pub use runner::Sandbox;
pub use verdict::{RunOutcome, SubmissionResult, TestCaseResult};

/// Sandbox-internal failures.
///
/// A failed compilation is not one of these: it is an ordinary judging result.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("Failed to prepare work directory: {0}")]
    Workspace(std::io::Error),

    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Compiles and runs one submission against its test cases
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CodeRunner: Send + Sync {
    async fn run(
        &self,
        language: Language,
        code: &str,
        test_cases: &[TestCase],
    ) -> Result<SubmissionResult, SandboxError>;
}
