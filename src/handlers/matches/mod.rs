//! Matchmaking and match handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Match routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/queue",
            post(handler::join_queue).delete(handler::leave_queue),
        )
        .route("/queue/status", get(handler::queue_status))
        .route("/{id}", get(handler::get_match))
        .route("/{id}/ready", post(handler::ready))
        .route("/{id}/complete", post(handler::complete_match))
        .route(
            "/{id}/submissions",
            get(crate::handlers::submissions::list_match_submissions),
        )
}
