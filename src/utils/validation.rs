//! Input validation utilities

use uuid::Uuid;

use crate::{
    constants::{self, MAX_SOURCE_CODE_SIZE, MAX_TEST_CASES},
    error::{AppError, AppResult},
    models::{Difficulty, TestCase},
    sandbox::Language,
};

/// Validate a user/player identifier
pub fn validate_identity(id: &Uuid) -> Result<(), &'static str> {
    if id.is_nil() {
        return Err("Identifier cannot be the nil UUID");
    }
    Ok(())
}

/// Validate source code size
pub fn validate_source_code(code: &str) -> Result<(), &'static str> {
    if code.trim().is_empty() {
        return Err("Source code cannot be empty");
    }
    if code.len() > MAX_SOURCE_CODE_SIZE {
        return Err("Source code exceeds maximum size of 64KB");
    }
    Ok(())
}

/// Validate the test case list of a submission
pub fn validate_test_cases(test_cases: &[TestCase]) -> Result<(), &'static str> {
    if test_cases.is_empty() {
        return Err("At least one test case is required");
    }
    if test_cases.len() > MAX_TEST_CASES {
        return Err("Too many test cases");
    }
    Ok(())
}

/// Difficulty from an optional request field; absent or blank means the default
pub fn difficulty_or_default(value: Option<&str>) -> AppResult<Difficulty> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(Difficulty::default()),
        Some(v) => Difficulty::parse(v).ok_or_else(|| {
            AppError::Validation(format!(
                "Invalid difficulty: {}. Expected one of {:?}",
                v,
                constants::difficulties::ALL
            ))
        }),
    }
}

/// Language from an optional request field; absent or blank means the default
pub fn language_or_default(value: Option<&str>) -> AppResult<Language> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(Language::default()),
        Some(v) => Language::parse(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_identity() {
        assert!(validate_identity(&Uuid::new_v4()).is_ok());
        assert!(validate_identity(&Uuid::nil()).is_err());
    }

    #[test]
    fn test_validate_source_code() {
        assert!(validate_source_code("print(1)").is_ok());
        assert!(validate_source_code("  \n").is_err());
        assert!(validate_source_code(&"x".repeat(MAX_SOURCE_CODE_SIZE + 1)).is_err());
    }

    #[test]
    fn test_validate_test_cases() {
        assert!(validate_test_cases(&[]).is_err());
        assert!(validate_test_cases(&[TestCase::new("1", "1")]).is_ok());
    }

    #[test]
    fn test_defaults_apply_to_missing_and_blank_values() {
        assert_eq!(difficulty_or_default(None).unwrap(), Difficulty::Medium);
        assert_eq!(difficulty_or_default(Some("")).unwrap(), Difficulty::Medium);
        assert_eq!(difficulty_or_default(Some("easy")).unwrap(), Difficulty::Easy);
        assert!(matches!(
            difficulty_or_default(Some("extreme")),
            Err(AppError::Validation(_))
        ));

        assert_eq!(language_or_default(None).unwrap(), Language::Go);
        assert_eq!(language_or_default(Some(" ")).unwrap(), Language::Go);
        assert_eq!(language_or_default(Some("rust")).unwrap(), Language::Rust);
        assert!(matches!(
            language_or_default(Some("cobol")),
            Err(AppError::UnsupportedLanguage(_))
        ));
    }
}
