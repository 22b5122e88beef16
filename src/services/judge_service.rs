//! Judge service: runs submissions through the sandbox and records the result

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::{
    db::repositories::{MatchStore, SubmissionStore},
    error::{AppError, AppResult},
    events::{publish_or_log, EventPublisher, RoomEvent},
    models::{room_id_for, NewSubmission, Submission, SubmissionOutcome, SubmissionStatus, TestCase},
    sandbox::{CodeRunner, Language, SubmissionResult},
    utils::{validate_identity, validate_source_code, validate_test_cases},
};

/// A player's code for a match
#[derive(Debug, Clone)]
pub struct SubmitCode {
    pub match_id: Uuid,
    pub player_id: Uuid,
    pub code: String,
    pub language: String,
    pub test_cases: Vec<TestCase>,
}

/// Judging result returned to the submitter
#[derive(Debug, Clone, Serialize)]
pub struct JudgeReport {
    pub submission_id: Uuid,
    #[serde(flatten)]
    pub result: SubmissionResult,
}

/// Submission judging
pub struct JudgeService {
    matches: Arc<dyn MatchStore>,
    submissions: Arc<dyn SubmissionStore>,
    runner: Arc<dyn CodeRunner>,
    events: Arc<dyn EventPublisher>,
    workers: Arc<Semaphore>,
}

impl JudgeService {
    /// `workers` bounds how many submissions are compiled and run at once
    pub fn new(
        matches: Arc<dyn MatchStore>,
        submissions: Arc<dyn SubmissionStore>,
        runner: Arc<dyn CodeRunner>,
        events: Arc<dyn EventPublisher>,
        workers: usize,
    ) -> Self {
        Self {
            matches,
            submissions,
            runner,
            events,
            workers: Arc::new(Semaphore::new(workers)),
        }
    }

    /// Judge a submission against its test cases and persist the outcome
    pub async fn submit(&self, request: SubmitCode) -> AppResult<JudgeReport> {
        validate_identity(&request.match_id).map_err(|e| AppError::Validation(e.to_string()))?;
        validate_identity(&request.player_id).map_err(|e| AppError::Validation(e.to_string()))?;
        validate_source_code(&request.code).map_err(|e| AppError::Validation(e.to_string()))?;
        validate_test_cases(&request.test_cases)
            .map_err(|e| AppError::Validation(e.to_string()))?;
        let language = Language::parse(&request.language)?;

        let record = self
            .matches
            .find_by_id(request.match_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Match not found".to_string()))?;
        if !record.has_player(&request.player_id) {
            return Err(AppError::Forbidden(
                "Player is not part of this match".to_string(),
            ));
        }
        if record.is_completed() {
            return Err(AppError::Conflict("Match is already completed".to_string()));
        }

        let submission = self
            .submissions
            .create(&NewSubmission {
                match_id: request.match_id,
                player_id: request.player_id,
                code: request.code.clone(),
                language: language.as_str().to_string(),
                status: SubmissionStatus::Running,
            })
            .await?;

        tracing::info!(
            submission_id = %submission.id,
            match_id = %request.match_id,
            player_id = %request.player_id,
            language = %language,
            test_cases = request.test_cases.len(),
            "Judging submission"
        );

        let result = self.judge(submission.id, language, &request).await?;
        self.record(&submission, &result).await?;

        tracing::info!(
            submission_id = %submission.id,
            status = %result.status,
            score = result.score,
            runtime_ms = result.runtime_ms,
            "Submission judged"
        );

        publish_or_log(
            self.events.as_ref(),
            RoomEvent::SubmissionResult {
                room_id: room_id_for(&submission.match_id),
                submission_id: submission.id,
                player_id: submission.player_id,
                status: result.status,
                score: result.score,
                runtime_ms: result.runtime_ms as i64,
            },
        )
        .await;

        Ok(JudgeReport {
            submission_id: submission.id,
            result,
        })
    }

    async fn judge(
        &self,
        submission_id: Uuid,
        language: Language,
        request: &SubmitCode,
    ) -> AppResult<SubmissionResult> {
        let _permit = self
            .workers
            .acquire()
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("judge pool closed: {}", e)))?;

        let result = match self
            .runner
            .run(language, &request.code, &request.test_cases)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(submission_id = %submission_id, error = %e, "Sandbox failure");
                SubmissionResult::sandbox_error(e.to_string(), request.test_cases.len())
            }
        };

        Ok(result)
    }

    /// Write the terminal state exactly once
    async fn record(&self, submission: &Submission, result: &SubmissionResult) -> AppResult<()> {
        let outcome = SubmissionOutcome {
            status: result.status,
            score: result.score,
            runtime_ms: result.runtime_ms as i64,
            error_message: result.error_message.clone(),
        };

        match self.submissions.finalize(submission.id, &outcome).await {
            Ok(Some(_)) => Ok(()),
            Ok(None) => Err(AppError::Conflict(format!(
                "Submission {} already has a terminal status",
                submission.id
            ))),
            Err(e) => Err(AppError::StoreFailure(format!(
                "submission {} was judged {} with score {} but the result could not be recorded: {}",
                submission.id, result.status, result.score, e
            ))),
        }
    }

    pub async fn get_submission(&self, id: Uuid) -> AppResult<Submission> {
        self.submissions
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))
    }

    /// Submissions of a match, oldest first
    pub async fn get_by_match(&self, match_id: Uuid) -> AppResult<Vec<Submission>> {
        if self.matches.find_by_id(match_id).await?.is_none() {
            return Err(AppError::NotFound("Match not found".to_string()));
        }
        self.submissions.list_by_match(match_id).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{
        constants::match_statuses,
        db::repositories::{MockMatchStore, MockSubmissionStore},
        events::MockEventPublisher,
        models::Match,
        sandbox::{MockCodeRunner, RunOutcome, SandboxError, TestCaseResult},
        services::match_service::tests::sample_match,
    };

    fn stored(new: &NewSubmission) -> Submission {
        Submission {
            id: Uuid::new_v4(),
            match_id: new.match_id,
            player_id: new.player_id,
            code: new.code.clone(),
            language: new.language.clone(),
            status: new.status.as_str().to_string(),
            score: 0,
            runtime_ms: 0,
            error_message: None,
            created_at: Utc::now(),
            judged_at: None,
        }
    }

    fn match_store(record: Match) -> MockMatchStore {
        let mut store = MockMatchStore::new();
        store
            .expect_find_by_id()
            .returning(move |_| Ok(Some(record.clone())));
        store
    }

    fn accepting_submissions() -> MockSubmissionStore {
        let mut store = MockSubmissionStore::new();
        store.expect_create().returning(|new| Ok(stored(new)));
        store.expect_finalize().returning(|id, outcome| {
            let mut submission = stored(&NewSubmission {
                match_id: Uuid::new_v4(),
                player_id: Uuid::new_v4(),
                code: String::new(),
                language: "go".into(),
                status: outcome.status,
            });
            submission.id = id;
            submission.score = outcome.score;
            Ok(Some(submission))
        });
        store
    }

    fn runner_echoing(actual: &'static str) -> MockCodeRunner {
        let mut runner = MockCodeRunner::new();
        runner.expect_run().returning(move |_, _, cases| {
            let results = cases
                .iter()
                .map(|case| {
                    let passed = case.expected_output == actual;
                    TestCaseResult {
                        input: case.input.clone(),
                        expected: case.expected_output.clone(),
                        actual: actual.to_string(),
                        passed,
                        runtime_ms: 3,
                        outcome: if passed { RunOutcome::Passed } else { RunOutcome::Failed },
                        error_message: None,
                    }
                })
                .collect();
            Ok(SubmissionResult::from_testcases(results, cases.len()))
        });
        runner
    }

    fn silent_events() -> MockEventPublisher {
        let mut events = MockEventPublisher::new();
        events.expect_publish().returning(|_| Ok(()));
        events
    }

    fn request(record: &Match, test_cases: Vec<TestCase>) -> SubmitCode {
        SubmitCode {
            match_id: record.id,
            player_id: record.player1_id,
            code: "package main".into(),
            language: "go".into(),
            test_cases,
        }
    }

    fn service(
        matches: MockMatchStore,
        submissions: MockSubmissionStore,
        runner: MockCodeRunner,
        events: MockEventPublisher,
    ) -> JudgeService {
        JudgeService::new(
            Arc::new(matches),
            Arc::new(submissions),
            Arc::new(runner),
            Arc::new(events),
            2,
        )
    }

    #[tokio::test]
    async fn test_correct_solution_scores_100() {
        let record = sample_match(Uuid::new_v4(), Uuid::new_v4(), None);
        let service = service(
            match_store(record.clone()),
            accepting_submissions(),
            runner_echoing("5"),
            silent_events(),
        );

        let report = service
            .submit(request(&record, vec![TestCase::new("2 3", "5")]))
            .await
            .unwrap();

        assert_eq!(report.result.status, SubmissionStatus::Passed);
        assert_eq!(report.result.score, 100);
        assert!(report.result.error_message.is_none());

        let body = serde_json::to_value(&report).unwrap();
        assert_eq!(body["submission_id"], serde_json::json!(report.submission_id));
        assert!(body.get("error_message").is_none());
    }

    #[tokio::test]
    async fn test_wrong_output_scores_0() {
        let record = sample_match(Uuid::new_v4(), Uuid::new_v4(), None);
        let service = service(
            match_store(record.clone()),
            accepting_submissions(),
            runner_echoing("0"),
            silent_events(),
        );

        let report = service
            .submit(request(&record, vec![TestCase::new("2 3", "5")]))
            .await
            .unwrap();

        assert_eq!(report.result.status, SubmissionStatus::Failed);
        assert_eq!(report.result.score, 0);
    }

    #[tokio::test]
    async fn test_partial_score_is_floored_and_persisted() {
        let record = sample_match(Uuid::new_v4(), Uuid::new_v4(), None);
        let mut submissions = MockSubmissionStore::new();
        submissions.expect_create().returning(|new| Ok(stored(new)));
        submissions
            .expect_finalize()
            .withf(|_, outcome| {
                outcome.status == SubmissionStatus::Failed
                    && outcome.score == 33
                    && outcome.runtime_ms == 9
                    && outcome.error_message.is_none()
            })
            .times(1)
            .returning(|_, _| Ok(Some(stored(&NewSubmission {
                match_id: Uuid::new_v4(),
                player_id: Uuid::new_v4(),
                code: String::new(),
                language: "go".into(),
                status: SubmissionStatus::Failed,
            }))));

        let service = service(
            match_store(record.clone()),
            submissions,
            runner_echoing("1"),
            silent_events(),
        );

        let cases = vec![
            TestCase::new("a", "1"),
            TestCase::new("b", "2"),
            TestCase::new("c", "3"),
        ];
        let report = service.submit(request(&record, cases)).await.unwrap();
        assert_eq!(report.result.score, 33);
        assert_eq!(report.result.runtime_ms, 9);
    }

    #[tokio::test]
    async fn test_compile_error_is_recorded_as_error() {
        let record = sample_match(Uuid::new_v4(), Uuid::new_v4(), None);
        let mut runner = MockCodeRunner::new();
        runner.expect_run().returning(|_, _, cases| {
            Ok(SubmissionResult::compile_error(
                "undefined: x".into(),
                cases.len(),
            ))
        });

        let service = service(
            match_store(record.clone()),
            accepting_submissions(),
            runner,
            silent_events(),
        );

        let report = service
            .submit(request(&record, vec![TestCase::new("", "1")]))
            .await
            .unwrap();

        assert_eq!(report.result.status, SubmissionStatus::Error);
        assert_eq!(report.result.score, 0);
        assert!(report.result.test_cases.is_empty());
        assert!(report.result.error_message.unwrap().contains("undefined: x"));
    }

    #[tokio::test]
    async fn test_sandbox_failure_becomes_error_status() {
        let record = sample_match(Uuid::new_v4(), Uuid::new_v4(), None);
        let mut runner = MockCodeRunner::new();
        runner.expect_run().returning(|_, _, _| {
            Err(SandboxError::Launch {
                program: "go".into(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            })
        });

        let service = service(
            match_store(record.clone()),
            accepting_submissions(),
            runner,
            silent_events(),
        );

        let report = service
            .submit(request(&record, vec![TestCase::new("", "1")]))
            .await
            .unwrap();

        assert_eq!(report.result.status, SubmissionStatus::Error);
        assert_eq!(report.result.score, 0);
    }

    #[tokio::test]
    async fn test_validation_happens_before_any_work() {
        let record = sample_match(Uuid::new_v4(), Uuid::new_v4(), None);
        let mut runner = MockCodeRunner::new();
        runner.expect_run().never();
        let mut submissions = MockSubmissionStore::new();
        submissions.expect_create().never();
        let service = service(
            match_store(record.clone()),
            submissions,
            runner,
            MockEventPublisher::new(),
        );

        let mut bad_language = request(&record, vec![TestCase::new("", "1")]);
        bad_language.language = "cobol".into();
        let err = service.submit(bad_language).await.unwrap_err();
        assert!(matches!(err, AppError::UnsupportedLanguage(_)));

        let err = service.submit(request(&record, vec![])).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let mut empty_code = request(&record, vec![TestCase::new("", "1")]);
        empty_code.code = String::new();
        let err = service.submit(empty_code).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let mut outsider = request(&record, vec![TestCase::new("", "1")]);
        outsider.player_id = Uuid::new_v4();
        let err = service.submit(outsider).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_completed_match_rejects_submissions() {
        let mut record = sample_match(Uuid::new_v4(), Uuid::new_v4(), None);
        record.status = match_statuses::COMPLETED.to_string();
        let service = service(
            match_store(record.clone()),
            MockSubmissionStore::new(),
            MockCodeRunner::new(),
            MockEventPublisher::new(),
        );

        let err = service
            .submit(request(&record, vec![TestCase::new("", "1")]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_store_failure_carries_the_result() {
        let record = sample_match(Uuid::new_v4(), Uuid::new_v4(), None);
        let mut submissions = MockSubmissionStore::new();
        submissions.expect_create().returning(|new| Ok(stored(new)));
        submissions
            .expect_finalize()
            .returning(|_, _| Err(AppError::Database("connection reset".into())));
        let mut events = MockEventPublisher::new();
        events.expect_publish().never();

        let service = service(
            match_store(record.clone()),
            submissions,
            runner_echoing("5"),
            events,
        );

        let err = service
            .submit(request(&record, vec![TestCase::new("2 3", "5")]))
            .await
            .unwrap_err();
        let AppError::StoreFailure(message) = err else {
            panic!("expected a store failure");
        };
        assert!(message.contains("passed"));
        assert!(message.contains("100"));
    }

    #[tokio::test]
    async fn test_second_terminal_write_conflicts() {
        let record = sample_match(Uuid::new_v4(), Uuid::new_v4(), None);
        let mut submissions = MockSubmissionStore::new();
        submissions.expect_create().returning(|new| Ok(stored(new)));
        submissions.expect_finalize().returning(|_, _| Ok(None));

        let service = service(
            match_store(record.clone()),
            submissions,
            runner_echoing("5"),
            MockEventPublisher::new(),
        );

        let err = service
            .submit(request(&record, vec![TestCase::new("2 3", "5")]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_result_event_is_published_to_match_room() {
        let record = sample_match(Uuid::new_v4(), Uuid::new_v4(), None);
        let room = record.room_id();
        let mut events = MockEventPublisher::new();
        events
            .expect_publish()
            .withf(move |event| {
                matches!(event, RoomEvent::SubmissionResult { room_id, score: 100, .. }
                    if *room_id == room)
            })
            .times(1)
            .returning(|_| Ok(()));

        let service = service(
            match_store(record.clone()),
            accepting_submissions(),
            runner_echoing("5"),
            events,
        );

        service
            .submit(request(&record, vec![TestCase::new("2 3", "5")]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_get_by_match_unknown_match() {
        let mut matches = MockMatchStore::new();
        matches.expect_find_by_id().returning(|_| Ok(None));
        let service = service(
            matches,
            MockSubmissionStore::new(),
            MockCodeRunner::new(),
            MockEventPublisher::new(),
        );

        let err = service.get_by_match(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_get_by_match_without_submissions_is_empty() {
        let record = sample_match(Uuid::new_v4(), Uuid::new_v4(), None);
        let mut submissions = MockSubmissionStore::new();
        submissions.expect_list_by_match().returning(|_| Ok(vec![]));
        let service = service(
            match_store(record.clone()),
            submissions,
            MockCodeRunner::new(),
            MockEventPublisher::new(),
        );

        assert!(service.get_by_match(record.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_submission_not_found() {
        let mut submissions = MockSubmissionStore::new();
        submissions.expect_find_by_id().returning(|_| Ok(None));
        let service = service(
            MockMatchStore::new(),
            submissions,
            MockCodeRunner::new(),
            MockEventPublisher::new(),
        );

        let err = service.get_submission(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
