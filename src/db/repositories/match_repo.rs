//! Match repository

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::MatchStore;
use crate::{
    error::AppResult,
    models::{Match, MatchDetails},
};

/// Repository for match database operations
#[derive(Clone)]
pub struct MatchRepository {
    pool: PgPool,
}

impl MatchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MatchStore for MatchRepository {
    async fn create(
        &self,
        player1_id: Uuid,
        player2_id: Uuid,
        problem_id: Option<Uuid>,
    ) -> AppResult<Match> {
        let record = sqlx::query_as::<_, Match>(
            r#"
            INSERT INTO matches (player1_id, player2_id, problem_id, status)
            VALUES ($1, $2, $3, 'waiting')
            RETURNING *
            "#,
        )
        .bind(player1_id)
        .bind(player2_id)
        .bind(problem_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Match>> {
        let record = sqlx::query_as::<_, Match>("SELECT * FROM matches WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    async fn find_details(&self, id: Uuid) -> AppResult<Option<MatchDetails>> {
        let details = sqlx::query_as::<_, MatchDetails>(
            r#"
            SELECT
                m.*,
                u1.username AS player1_username,
                u2.username AS player2_username,
                p.title AS problem_title
            FROM matches m
            LEFT JOIN users u1 ON u1.id = m.player1_id
            LEFT JOIN users u2 ON u2.id = m.player2_id
            LEFT JOIN problems p ON p.id = m.problem_id
            WHERE m.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(details)
    }

    async fn mark_ready(&self, id: Uuid, player_id: Uuid) -> AppResult<Option<Match>> {
        // Right-hand sides see the pre-update row
        let record = sqlx::query_as::<_, Match>(
            r#"
            UPDATE matches SET
                player1_ready = player1_ready OR player1_id = $2,
                player2_ready = player2_ready OR player2_id = $2,
                status = CASE
                    WHEN status = 'waiting'
                        AND (player1_ready OR player1_id = $2)
                        AND (player2_ready OR player2_id = $2)
                    THEN 'active'
                    ELSE status
                END,
                updated_at = NOW()
            WHERE id = $1 AND (player1_id = $2 OR player2_id = $2)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn complete(
        &self,
        id: Uuid,
        winner_id: Option<Uuid>,
        duration_seconds: i32,
    ) -> AppResult<Option<Match>> {
        let record = sqlx::query_as::<_, Match>(
            r#"
            UPDATE matches SET
                status = 'completed',
                winner_id = $2,
                duration_seconds = $3,
                updated_at = CASE WHEN status = 'completed' THEN updated_at ELSE NOW() END
            WHERE id = $1
              AND (
                status <> 'completed'
                OR (winner_id IS NOT DISTINCT FROM $2 AND duration_seconds = $3)
              )
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(winner_id)
        .bind(duration_seconds)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}
