//! C++ language handler

use super::LanguageHandler;

/// Get handler for C++
pub fn handler() -> LanguageHandler {
    LanguageHandler::new(
        "cpp",
        "solution.cpp",
        Some(&["g++", "-O2", "-std=c++17", "-o", "solution", "solution.cpp"]),
        &["./solution"],
    )
}
