//! HTTP Request Handlers
//!
//! This module contains all HTTP request handlers organized by domain.

pub mod health;
pub mod matches;
pub mod submissions;

use axum::Router;

use crate::state::AppState;

/// Create all API routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .nest("/matches", matches::routes())
        .nest("/submissions", submissions::routes())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::{
        config::{
            Config, DatabaseConfig, JudgeConfig, LogFormat, QueueBackend, QueueConfig,
            RedisConfig, SandboxConfig, ServerConfig,
        },
        constants::API_BASE_PATH,
        db::repositories::{MockMatchStore, MockProblemCatalog, MockSubmissionStore},
        events::MockEventPublisher,
        queue::{DuplicateJoinPolicy, MemoryQueueStore},
        sandbox::MockCodeRunner,
        services::{match_service::tests::sample_match, JudgeService, MatchService},
    };

    fn test_config() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 0,
                rust_log: "info".into(),
                log_format: LogFormat::Pretty,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/unused".into(),
                max_connections: 1,
            },
            redis: RedisConfig {
                url: "redis://localhost:6379".into(),
            },
            queue: QueueConfig {
                backend: QueueBackend::Memory,
                duplicate_policy: DuplicateJoinPolicy::Coexist,
            },
            sandbox: SandboxConfig::default(),
            judge: JudgeConfig { workers: 1 },
        }
    }

    fn app() -> Router {
        let mut matches = MockMatchStore::new();
        matches
            .expect_create()
            .returning(|p1, p2, problem| Ok(sample_match(p1, p2, problem)));
        matches.expect_find_details().returning(|_| Ok(None));
        matches.expect_find_by_id().returning(|_| Ok(None));

        let mut problems = MockProblemCatalog::new();
        problems.expect_random_problem().returning(|_, _| Ok(None));

        let mut events = MockEventPublisher::new();
        events.expect_publish().returning(|_| Ok(()));

        let matches = Arc::new(matches);
        let events = Arc::new(events);

        let match_service = MatchService::new(
            Arc::new(MemoryQueueStore::default()),
            matches.clone(),
            Arc::new(problems),
            events.clone(),
        );
        let judge_service = JudgeService::new(
            matches,
            Arc::new(MockSubmissionStore::new()),
            Arc::new(MockCodeRunner::new()),
            events,
            1,
        );

        let state = AppState::new(match_service, judge_service, test_config());
        Router::new()
            .nest(API_BASE_PATH, routes())
            .with_state(state)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["queue_backend"], "memory");
    }

    #[tokio::test]
    async fn test_join_queue_then_match() {
        let app = app();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/matches/queue",
                json!({ "user_id": a, "difficulty": "easy", "language": "python" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "status": "queued" }));

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/matches/queue",
                json!({ "user_id": b, "difficulty": "easy", "language": "python" }),
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["status"], "matched");
        assert_eq!(body["match"]["player1_id"], json!(a));
        assert_eq!(body["match"]["player2_id"], json!(b));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/matches/queue/status?difficulty=easy&language=python")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(body_json(response).await["queue_size"], 0);
    }

    #[tokio::test]
    async fn test_unsupported_language_is_bad_request() {
        let response = app()
            .oneshot(json_request(
                "POST",
                "/api/v1/matches/queue",
                json!({ "user_id": Uuid::new_v4(), "language": "cobol" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"]["code"],
            "UNSUPPORTED_LANGUAGE"
        );
    }

    #[tokio::test]
    async fn test_unknown_match_is_not_found() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/matches/{}", Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_submission_without_test_cases_is_rejected() {
        let response = app()
            .oneshot(json_request(
                "POST",
                "/api/v1/submissions",
                json!({
                    "match_id": Uuid::new_v4(),
                    "player_id": Uuid::new_v4(),
                    "code": "print(1)",
                    "language": "python",
                    "test_cases": []
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
    }
}
