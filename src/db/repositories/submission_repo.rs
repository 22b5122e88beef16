//! Submission repository

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::SubmissionStore;
use crate::{
    error::AppResult,
    models::{NewSubmission, Submission, SubmissionOutcome},
};

/// Repository for submission database operations
#[derive(Clone)]
pub struct SubmissionRepository {
    pool: PgPool,
}

impl SubmissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubmissionStore for SubmissionRepository {
    async fn create(&self, submission: &NewSubmission) -> AppResult<Submission> {
        let submission = sqlx::query_as::<_, Submission>(
            r#"
            INSERT INTO submissions (match_id, player_id, code, language, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(submission.match_id)
        .bind(submission.player_id)
        .bind(&submission.code)
        .bind(&submission.language)
        .bind(submission.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(submission)
    }

    async fn finalize(
        &self,
        id: Uuid,
        outcome: &SubmissionOutcome,
    ) -> AppResult<Option<Submission>> {
        let submission = sqlx::query_as::<_, Submission>(
            r#"
            UPDATE submissions
            SET status = $2, score = $3, runtime_ms = $4, error_message = $5, judged_at = NOW()
            WHERE id = $1 AND status IN ('pending', 'running')
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(outcome.status.as_str())
        .bind(outcome.score)
        .bind(outcome.runtime_ms)
        .bind(&outcome.error_message)
        .fetch_optional(&self.pool)
        .await?;

        Ok(submission)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Submission>> {
        let submission = sqlx::query_as::<_, Submission>("SELECT * FROM submissions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(submission)
    }

    async fn list_by_match(&self, match_id: Uuid) -> AppResult<Vec<Submission>> {
        let submissions = sqlx::query_as::<_, Submission>(
            "SELECT * FROM submissions WHERE match_id = $1 ORDER BY created_at ASC",
        )
        .bind(match_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(submissions)
    }
}
