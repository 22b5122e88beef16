//! Problem repository

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::ProblemCatalog;
use crate::{error::AppResult, models::Difficulty, sandbox::Language};

/// Read-only access to the problem catalog
#[derive(Clone)]
pub struct ProblemRepository {
    pool: PgPool,
}

impl ProblemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProblemCatalog for ProblemRepository {
    async fn random_problem(
        &self,
        difficulty: Difficulty,
        language: Language,
    ) -> AppResult<Option<Uuid>> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM problems
            WHERE difficulty = $1 AND language = $2
            ORDER BY random()
            LIMIT 1
            "#,
        )
        .bind(difficulty.as_str())
        .bind(language.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(id)
    }
}
