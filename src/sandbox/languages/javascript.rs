//! JavaScript (Node.js) language handler

use super::LanguageHandler;

/// Get handler for JavaScript
pub fn handler() -> LanguageHandler {
    LanguageHandler::new(
        "javascript",
        "solution.js",
        None,
        &["node", "solution.js"],
    )
}
