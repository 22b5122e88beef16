//! Domain models
//!
//! This module contains all domain models used throughout the application.

pub mod difficulty;
pub mod matches;
pub mod submission;
pub mod test_case;

pub use difficulty::*;
pub use matches::*;
pub use submission::*;
pub use test_case::*;
