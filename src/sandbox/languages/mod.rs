//! Language-specific handlers for compilation and execution
//!
//! Every command runs with the submission's work directory as its current
//! directory, so paths are relative to it. Interpreted languages have no
//! compile step: a script that fails to parse exits non-zero on every case.

pub mod cpp;
pub mod go;
pub mod javascript;
pub mod python;
pub mod rust;

use serde::{Deserialize, Serialize};

use crate::{
    constants::languages,
    error::{AppError, AppResult},
};

/// Closed set of languages a submission can be written in
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Go,
    Python,
    JavaScript,
    Cpp,
    Rust,
}

impl Language {
    /// Get language as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Go => languages::GO,
            Self::Python => languages::PYTHON,
            Self::JavaScript => languages::JAVASCRIPT,
            Self::Cpp => languages::CPP,
            Self::Rust => languages::RUST,
        }
    }

    /// Parse a language tag, failing fast on anything outside the supported set
    pub fn parse(tag: &str) -> AppResult<Self> {
        match tag {
            languages::GO => Ok(Self::Go),
            languages::PYTHON => Ok(Self::Python),
            languages::JAVASCRIPT => Ok(Self::JavaScript),
            languages::CPP => Ok(Self::Cpp),
            languages::RUST => Ok(Self::Rust),
            other => Err(AppError::UnsupportedLanguage(format!(
                "{}. Supported languages: {:?}",
                other,
                languages::ALL
            ))),
        }
    }

    /// Get the compile/run handler for this language
    pub fn handler(&self) -> LanguageHandler {
        match self {
            Self::Go => go::handler(),
            Self::Python => python::handler(),
            Self::JavaScript => javascript::handler(),
            Self::Cpp => cpp::handler(),
            Self::Rust => rust::handler(),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Language handler for compilation and execution
#[derive(Debug, Clone)]
pub struct LanguageHandler {
    name: &'static str,
    source_file: &'static str,
    compile_command: Option<&'static [&'static str]>,
    run_command: &'static [&'static str],
}

impl LanguageHandler {
    pub(crate) const fn new(
        name: &'static str,
        source_file: &'static str,
        compile_command: Option<&'static [&'static str]>,
        run_command: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            source_file,
            compile_command,
            run_command,
        }
    }

    /// Language name, used in logs
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Get the source file name
    pub fn source_file(&self) -> &'static str {
        self.source_file
    }

    /// Get the compile command (if needed)
    pub fn compile_command(&self) -> Option<Vec<String>> {
        self.compile_command.map(to_argv)
    }

    /// Get the run command
    pub fn run_command(&self) -> Vec<String> {
        to_argv(self.run_command)
    }
}

fn to_argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_supported_languages() {
        for tag in languages::ALL {
            let language = Language::parse(tag).unwrap();
            assert_eq!(language.as_str(), *tag);
            assert_eq!(language.handler().name(), *tag);
        }
    }

    #[test]
    fn test_parse_unsupported_language() {
        let err = Language::parse("cobol").unwrap_err();
        assert!(matches!(err, AppError::UnsupportedLanguage(_)));
        assert!(Language::parse("Go").is_err());
    }

    #[test]
    fn test_compiled_languages_run_the_binary() {
        for language in [Language::Go, Language::Cpp, Language::Rust] {
            let handler = language.handler();
            assert!(handler.compile_command().is_some());
            assert_eq!(handler.run_command(), vec!["./solution".to_string()]);
        }
    }

    #[test]
    fn test_interpreted_languages_run_the_source() {
        let python = Language::Python.handler();
        assert_eq!(python.source_file(), "solution.py");
        assert_eq!(python.run_command(), vec!["python3", "solution.py"]);

        assert!(python.compile_command().is_none());

        let js = Language::JavaScript.handler();
        assert!(js.compile_command().is_none());
        assert_eq!(js.run_command(), vec!["node", "solution.js"]);
    }
}
