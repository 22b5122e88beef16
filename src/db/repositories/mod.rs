//! Database repositories
//!
//! Repositories handle all direct database interactions. Services only see
//! the store traits, so they can be exercised without a database.

pub mod match_repo;
pub mod problem_repo;
pub mod submission_repo;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Difficulty, Match, MatchDetails, NewSubmission, Submission, SubmissionOutcome},
    sandbox::Language,
};

pub use match_repo::MatchRepository;
pub use problem_repo::ProblemRepository;
pub use submission_repo::SubmissionRepository;

/// Persistence of match records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Create a match in the waiting state
    async fn create(
        &self,
        player1_id: Uuid,
        player2_id: Uuid,
        problem_id: Option<Uuid>,
    ) -> AppResult<Match>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Match>>;

    /// Match joined with player usernames and the problem title
    async fn find_details(&self, id: Uuid) -> AppResult<Option<MatchDetails>>;

    /// Mark `player_id` ready; the match turns active once both are.
    /// `None` when the match does not exist or the player is not in it.
    async fn mark_ready(&self, id: Uuid, player_id: Uuid) -> AppResult<Option<Match>>;

    /// Compare-and-set completion. Repeating the same values returns the
    /// stored match; `None` when it was already completed differently.
    async fn complete(
        &self,
        id: Uuid,
        winner_id: Option<Uuid>,
        duration_seconds: i32,
    ) -> AppResult<Option<Match>>;
}

/// Persistence of submission records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn create(&self, submission: &NewSubmission) -> AppResult<Submission>;

    /// Write the terminal state; `None` if the submission is already terminal
    async fn finalize(
        &self,
        id: Uuid,
        outcome: &SubmissionOutcome,
    ) -> AppResult<Option<Submission>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Submission>>;

    /// Submissions of a match, oldest first
    async fn list_by_match(&self, match_id: Uuid) -> AppResult<Vec<Submission>>;
}

/// Read-only view of the problem catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProblemCatalog: Send + Sync {
    /// A random problem for the partition, if the catalog has one
    async fn random_problem(
        &self,
        difficulty: Difficulty,
        language: Language,
    ) -> AppResult<Option<Uuid>>;
}
