//! Submission runner: work area, compile step and per-case execution

use std::path::Path;

use async_trait::async_trait;
use tempfile::TempDir;

use super::executor::{execute, ExecutionLimits, ProcessOutput};
use super::verdict::{RunOutcome, SubmissionResult, TestCaseResult};
use super::{CodeRunner, Language, LanguageHandler, SandboxError};
use crate::config::SandboxConfig;
use crate::constants::MAX_DIAGNOSTIC_LENGTH;
use crate::models::TestCase;

/// Local process sandbox
#[derive(Debug, Clone)]
pub struct Sandbox {
    config: SandboxConfig,
}

impl Sandbox {
    pub fn new(config: SandboxConfig) -> Self {
        Self { config }
    }

    /// Judge `code` with an explicit handler instead of a [`Language`]
    pub async fn judge_with_handler(
        &self,
        handler: &LanguageHandler,
        code: &str,
        test_cases: &[TestCase],
    ) -> Result<SubmissionResult, SandboxError> {
        let workspace = self.create_workspace()?;
        let workdir = workspace.path();

        tokio::fs::write(workdir.join(handler.source_file()), code)
            .await
            .map_err(SandboxError::Workspace)?;

        if let Some(compile_command) = handler.compile_command() {
            let limits = ExecutionLimits::for_compile(
                self.config.compile_timeout(),
                self.config.output_limit_kb,
            );
            let output = execute(&compile_command, workdir, "", &limits).await?;
            if !output.success() {
                tracing::debug!(language = handler.name(), "Compilation failed");
                return Ok(SubmissionResult::compile_error(
                    compile_diagnostic(&output, self.config.compile_timeout_ms),
                    test_cases.len(),
                ));
            }
        }

        let run_command = handler.run_command();
        let limits = ExecutionLimits::for_run(
            self.config.run_timeout(),
            self.config.memory_limit_mb,
            self.config.output_limit_kb,
        );

        let mut results = Vec::with_capacity(test_cases.len());
        for test_case in test_cases {
            results.push(run_test_case(&run_command, workdir, test_case, &limits).await?);
        }

        // workspace is removed when dropped here
        Ok(SubmissionResult::from_testcases(results, test_cases.len()))
    }

    fn create_workspace(&self) -> Result<TempDir, SandboxError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("submission-");
        let workspace = match &self.config.work_dir {
            Some(dir) => builder.tempdir_in(dir),
            None => builder.tempdir(),
        };
        workspace.map_err(SandboxError::Workspace)
    }
}

#[async_trait]
impl CodeRunner for Sandbox {
    async fn run(
        &self,
        language: Language,
        code: &str,
        test_cases: &[TestCase],
    ) -> Result<SubmissionResult, SandboxError> {
        self.judge_with_handler(&language.handler(), code, test_cases)
            .await
    }
}

async fn run_test_case(
    run_command: &[String],
    workdir: &Path,
    test_case: &TestCase,
    limits: &ExecutionLimits,
) -> Result<TestCaseResult, SandboxError> {
    let output = execute(run_command, workdir, &test_case.input, limits).await?;
    let runtime_ms = output.elapsed.as_millis() as u64;

    let (outcome, actual, error_message) = if output.timed_out {
        (RunOutcome::Timeout, String::new(), Some(output.failure_message()))
    } else if !output.success() {
        (
            RunOutcome::RuntimeError,
            normalize_output(&output.stdout),
            Some(output.failure_message()),
        )
    } else {
        let actual = normalize_output(&output.stdout);
        if actual == normalize_output(&test_case.expected_output) {
            (RunOutcome::Passed, actual, None)
        } else {
            (RunOutcome::Failed, actual, None)
        }
    };

    Ok(TestCaseResult {
        input: test_case.input.clone(),
        expected: test_case.expected_output.clone(),
        actual,
        passed: outcome.is_passed(),
        runtime_ms,
        outcome,
        error_message,
    })
}

/// Trim surrounding whitespace and normalize CRLF to LF
fn normalize_output(output: &str) -> String {
    output.replace("\r\n", "\n").trim().to_string()
}

/// Diagnostic text for a failed compile: stderr, else stdout, truncated
fn compile_diagnostic(output: &ProcessOutput, timeout_ms: u64) -> String {
    if output.timed_out {
        return format!("compilation exceeded {} ms", timeout_ms);
    }

    let text = if output.stderr.trim().is_empty() {
        output.stdout.trim()
    } else {
        output.stderr.trim()
    };

    if text.is_empty() {
        return output.failure_message();
    }
    text.chars().take(MAX_DIAGNOSTIC_LENGTH).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubmissionStatus;

    fn shell_handler() -> LanguageHandler {
        LanguageHandler::new(
            "sh",
            "solution.sh",
            Some(&["sh", "-n", "solution.sh"]),
            &["sh", "solution.sh"],
        )
    }

    fn interpreted_handler() -> LanguageHandler {
        LanguageHandler::new("sh", "solution.sh", None, &["sh", "solution.sh"])
    }

    fn sandbox(run_timeout_ms: u64) -> Sandbox {
        Sandbox::new(SandboxConfig {
            run_timeout_ms,
            ..SandboxConfig::default()
        })
    }

    const SUM: &str = "read a b\necho $((a + b))\n";

    #[tokio::test]
    async fn test_correct_solution_passes() {
        let cases = vec![TestCase::new("2 3", "5"), TestCase::new("10 -4", "6")];
        let result = sandbox(2000)
            .judge_with_handler(&shell_handler(), SUM, &cases)
            .await
            .unwrap();

        assert_eq!(result.status, SubmissionStatus::Passed);
        assert_eq!(result.score, 100);
        assert_eq!(result.test_cases.len(), 2);
        assert!(result.test_cases.iter().all(|c| c.outcome == RunOutcome::Passed));
    }

    #[tokio::test]
    async fn test_wrong_output_fails() {
        let cases = vec![TestCase::new("2 3", "5")];
        let result = sandbox(2000)
            .judge_with_handler(&shell_handler(), "echo 42\n", &cases)
            .await
            .unwrap();

        assert_eq!(result.status, SubmissionStatus::Failed);
        assert_eq!(result.score, 0);
        assert_eq!(result.test_cases[0].actual, "42");
        assert_eq!(result.test_cases[0].outcome, RunOutcome::Failed);
    }

    #[tokio::test]
    async fn test_crlf_and_trailing_whitespace_are_ignored() {
        let cases = vec![TestCase::new("", "a\nb")];
        let result = sandbox(2000)
            .judge_with_handler(&shell_handler(), "printf 'a\\r\\nb\\r\\n\\n'\n", &cases)
            .await
            .unwrap();

        assert_eq!(result.status, SubmissionStatus::Passed);
    }

    #[tokio::test]
    async fn test_syntax_error_short_circuits() {
        let cases = vec![TestCase::new("1 1", "2")];
        let result = sandbox(2000)
            .judge_with_handler(&shell_handler(), "fi\n", &cases)
            .await
            .unwrap();

        assert_eq!(result.status, SubmissionStatus::Error);
        assert_eq!(result.score, 0);
        assert!(result.test_cases.is_empty());
        assert!(result.error_message.unwrap().starts_with("Compilation error"));
    }

    #[tokio::test]
    async fn test_unparsable_script_fails_each_case() {
        let cases = vec![TestCase::new("1 1", "2"), TestCase::new("2 2", "4")];
        let result = sandbox(2000)
            .judge_with_handler(&interpreted_handler(), "fi\n", &cases)
            .await
            .unwrap();

        assert_eq!(result.status, SubmissionStatus::Failed);
        assert_eq!(result.score, 0);
        assert_eq!(result.test_cases.len(), 2);
        assert!(result
            .test_cases
            .iter()
            .all(|c| c.outcome == RunOutcome::RuntimeError && !c.passed));
    }

    #[tokio::test]
    async fn test_noisy_stderr_does_not_change_the_verdict() {
        let code = "head -c 300000 /dev/zero >&2\nread a b\necho $((a + b))\n";
        let cases = vec![TestCase::new("2 3", "5")];
        let result = sandbox(5000)
            .judge_with_handler(&interpreted_handler(), code, &cases)
            .await
            .unwrap();

        assert_eq!(result.status, SubmissionStatus::Passed);
        assert_eq!(result.test_cases[0].outcome, RunOutcome::Passed);
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_runtime_error() {
        let cases = vec![TestCase::new("", "ok"), TestCase::new("", "ok")];
        let result = sandbox(2000)
            .judge_with_handler(&shell_handler(), "echo ok\nexit 1\n", &cases)
            .await
            .unwrap();

        assert_eq!(result.status, SubmissionStatus::Failed);
        assert_eq!(result.test_cases[0].outcome, RunOutcome::RuntimeError);
        assert!(!result.test_cases[0].passed);
    }

    #[tokio::test]
    async fn test_slow_solution_times_out() {
        let cases = vec![TestCase::new("", "done")];
        let result = sandbox(200)
            .judge_with_handler(&shell_handler(), "sleep 5\necho done\n", &cases)
            .await
            .unwrap();

        assert_eq!(result.status, SubmissionStatus::Timeout);
        assert_eq!(result.test_cases[0].outcome, RunOutcome::Timeout);
    }

    #[tokio::test]
    async fn test_missing_toolchain_is_a_sandbox_error() {
        let handler = LanguageHandler::new("none", "main.x", None, &["no-such-interpreter-xyz"]);
        let err = sandbox(2000)
            .judge_with_handler(&handler, "", &[TestCase::new("", "")])
            .await
            .unwrap_err();

        assert!(matches!(err, SandboxError::Launch { .. }));
    }

    #[tokio::test]
    #[ignore = "requires the go toolchain"]
    async fn test_go_sum() {
        let code = r#"package main

import "fmt"

func main() {
	var a, b int
	fmt.Scan(&a, &b)
	fmt.Println(a + b)
}
"#;
        let cases = vec![TestCase::new("2 3", "5"), TestCase::new("10 20", "30")];
        let result = Sandbox::new(SandboxConfig::default())
            .run(Language::Go, code, &cases)
            .await
            .unwrap();

        assert_eq!(result.status, SubmissionStatus::Passed);
        assert_eq!(result.score, 100);
    }

    #[tokio::test]
    #[ignore = "requires python3"]
    async fn test_python_wrong_answer() {
        let cases = vec![TestCase::new("2 3", "5")];
        let result = Sandbox::new(SandboxConfig::default())
            .run(Language::Python, "print(0)\n", &cases)
            .await
            .unwrap();

        assert_eq!(result.status, SubmissionStatus::Failed);
        assert_eq!(result.score, 0);
    }
}
