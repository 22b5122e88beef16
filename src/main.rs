//! CodeRoulette - Application Entry Point
//!
//! This is the main entry point for the CodeRoulette duel server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use redis::Client as RedisClient;
use tokio::net::TcpListener;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coderoulette::{
    config::{Config, LogFormat, QueueBackend, ServerConfig},
    constants::{API_BASE_PATH, MAX_SOURCE_CODE_SIZE},
    db::{
        self,
        repositories::{MatchRepository, ProblemRepository, SubmissionRepository},
    },
    events::RedisEventPublisher,
    handlers,
    queue::{MemoryQueueStore, QueueStore, RedisQueueStore},
    sandbox::Sandbox,
    services::{JudgeService, MatchService},
    state::AppState,
};

/// Request bodies carry source code plus test cases
const MAX_REQUEST_BODY_SIZE: usize = MAX_SOURCE_CODE_SIZE * 16;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config.server);

    tracing::info!("Starting CodeRoulette server...");

    // Initialize database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&config.database).await?;

    // Run database migrations
    tracing::info!("Running database migrations...");
    db::run_migrations(&db_pool).await?;

    // Initialize Redis connection
    tracing::info!("Connecting to Redis...");
    let redis_client = RedisClient::open(config.redis.url.as_str())?;
    let redis_conn = redis::aio::ConnectionManager::new(redis_client).await?;

    let queue: Arc<dyn QueueStore> = match config.queue.backend {
        QueueBackend::Redis => Arc::new(RedisQueueStore::new(
            redis_conn.clone(),
            config.queue.duplicate_policy,
        )),
        QueueBackend::Memory => {
            tracing::warn!("In-memory queue selected; pairing only works within this instance");
            Arc::new(MemoryQueueStore::new(config.queue.duplicate_policy))
        }
    };

    let matches = Arc::new(MatchRepository::new(db_pool.clone()));
    let events = Arc::new(RedisEventPublisher::new(redis_conn));

    let match_service = MatchService::new(
        queue,
        matches.clone(),
        Arc::new(ProblemRepository::new(db_pool.clone())),
        events.clone(),
    );
    let judge_service = JudgeService::new(
        matches,
        Arc::new(SubmissionRepository::new(db_pool)),
        Arc::new(Sandbox::new(config.sandbox.clone())),
        events,
        config.judge.workers,
    );

    tracing::info!(
        queue_backend = config.queue.backend.as_str(),
        judge_workers = config.judge.workers,
        "Services initialised"
    );

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    // Create application state
    let state = AppState::new(match_service, judge_service, config);

    // Build the router
    let app = Router::new()
        .nest(API_BASE_PATH, handlers::routes())
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start the server
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| server.rust_log.clone().into());

    match server.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
