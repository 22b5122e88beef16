//! Go language handler

use super::LanguageHandler;

/// Get handler for Go
pub fn handler() -> LanguageHandler {
    LanguageHandler::new(
        "go",
        "solution.go",
        Some(&["go", "build", "-o", "solution", "solution.go"]),
        &["./solution"],
    )
}
