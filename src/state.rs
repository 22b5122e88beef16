//! Application state management
//!
//! This module contains the shared application state that is passed
//! to all request handlers via Axum's State extractor.

use std::sync::Arc;

use crate::config::Config;
use crate::services::{JudgeService, MatchService};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

/// Inner state (wrapped in Arc for cheap cloning)
struct AppStateInner {
    /// Matchmaking and match lifecycle
    matches: MatchService,

    /// Submission judging
    judge: JudgeService,

    /// Application configuration
    config: Config,
}

impl AppState {
    /// Create a new application state
    pub fn new(matches: MatchService, judge: JudgeService, config: Config) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                matches,
                judge,
                config,
            }),
        }
    }

    pub fn matches(&self) -> &MatchService {
        &self.inner.matches
    }

    pub fn judge(&self) -> &JudgeService {
        &self.inner.judge
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }
}
