//! CodeRoulette - Head-to-head coding duels
//!
//! This library provides the duel core: a partitioned matchmaking queue that
//! pairs waiting players, and a judge that compiles and runs their code
//! against test cases under a deadline.
//!
//! # Features
//!
//! - Atomic FIFO pairing per (difficulty, language), backed by Redis or memory
//! - Multi-language sandbox (Go, Python, JavaScript, C++, Rust)
//! - Deadlines and rlimits on every compile and run
//! - Room events published over Redis pub/sub
//!
//! # Architecture
//!
//! The application follows a layered architecture:
//! - **Handlers**: HTTP request handlers (thin layer)
//! - **Services**: Business logic
//! - **Queue / Repositories**: Redis and database access behind traits
//! - **Sandbox**: Process execution of untrusted code
//! - **Models**: Domain models and DTOs

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod events;
pub mod handlers;
pub mod models;
pub mod queue;
pub mod sandbox;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;
