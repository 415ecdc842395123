//! Crate error types.

use thiserror::Error;

/// Errors produced by document and structural editing operations. Stale
/// positions are not an error: the edit entry points clamp them to the
/// current line grid instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("no language registered for code {0:?}")]
    UnknownLang(String),

    #[error("history merge requires an existing entry")]
    NoHistoryEntry,
}

/// A failure while parsing one language range. Parse failures are contained:
/// the owning range logs them and keeps its previous state.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{lang_code} parse failed: {message}")]
pub struct ParseError {
    pub lang_code: String,
    pub message: String,
}

impl ParseError {
    pub fn new(lang_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            lang_code: lang_code.into(),
            message: message.into(),
        }
    }
}
