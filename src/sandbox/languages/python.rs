//! Python language handler

use super::LanguageHandler;

/// Get handler for Python
pub fn handler() -> LanguageHandler {
    LanguageHandler::new(
        "python",
        "solution.py",
        None,
        &["python3", "solution.py"],
    )
}
