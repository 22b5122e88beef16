//! Utility functions

pub mod validation;

pub use validation::{
    difficulty_or_default, language_or_default, validate_identity, validate_source_code,
    validate_test_cases,
};
