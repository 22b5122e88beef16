//! Rust language handler

use super::LanguageHandler;

/// Get handler for Rust
pub fn handler() -> LanguageHandler {
    LanguageHandler::new(
        "rust",
        "solution.rs",
        Some(&["rustc", "-O", "-o", "solution", "solution.rs"]),
        &["./solution"],
    )
}
