//! Per-case outcomes and submission-level aggregation

use serde::{Deserialize, Serialize};

use crate::models::SubmissionStatus;

/// How a single test case run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Output matched the expected output
    Passed,
    /// Program exited cleanly with the wrong output
    Failed,
    /// Non-zero exit, signal or output limit
    RuntimeError,
    /// Killed at the run deadline
    Timeout,
}

impl RunOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

/// Result of executing a single test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCaseResult {
    pub input: String,
    pub expected: String,
    pub actual: String,
    pub passed: bool,
    pub runtime_ms: u64,
    pub outcome: RunOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Aggregated result of judging one submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub status: SubmissionStatus,
    pub score: i32,
    pub runtime_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub test_cases: Vec<TestCaseResult>,
    pub passed_count: usize,
    pub total_count: usize,
}

impl SubmissionResult {
    /// Aggregate the per-case results of a program that compiled.
    ///
    /// `total` is the number of test cases submitted, which is the score
    /// denominator even if fewer results are present.
    pub fn from_testcases(results: Vec<TestCaseResult>, total: usize) -> Self {
        let passed_count = results.iter().filter(|r| r.passed).count();
        let score = compute_score(passed_count, total);
        let runtime_ms = results.iter().map(|r| r.runtime_ms).sum();
        let any_timeout = results.iter().any(|r| r.outcome == RunOutcome::Timeout);

        let status = if score == 100 {
            SubmissionStatus::Passed
        } else if any_timeout {
            SubmissionStatus::Timeout
        } else {
            SubmissionStatus::Failed
        };

        Self {
            status,
            score,
            runtime_ms,
            error_message: None,
            test_cases: results,
            passed_count,
            total_count: total,
        }
    }

    /// Compilation failed: nothing ran
    pub fn compile_error(diagnostic: String, total: usize) -> Self {
        Self::error(format!("Compilation error: {}", diagnostic), total)
    }

    /// The sandbox itself faulted
    pub fn sandbox_error(message: String, total: usize) -> Self {
        Self::error(message, total)
    }

    fn error(message: String, total: usize) -> Self {
        Self {
            status: SubmissionStatus::Error,
            score: 0,
            runtime_ms: 0,
            error_message: Some(message),
            test_cases: Vec::new(),
            passed_count: 0,
            total_count: total,
        }
    }
}

/// `floor(passed * 100 / total)`, zero for an empty test list
pub fn compute_score(passed: usize, total: usize) -> i32 {
    if total == 0 {
        return 0;
    }
    (passed * 100 / total) as i32
}
