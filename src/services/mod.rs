//! Business logic services

pub mod judge_service;
pub mod match_service;

pub use judge_service::{JudgeReport, JudgeService, SubmitCode};
pub use match_service::{JoinOutcome, MatchService, QueueStatus};
