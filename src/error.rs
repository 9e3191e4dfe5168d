//! Error types for the quiz core

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading banks, building exams, or persisting
/// results
#[derive(Debug, Error)]
pub enum QuizError {
    /// A structured test file does not match the expected shape
    #[error("invalid test file format: {0}")]
    Format(String),

    /// A selection yielded zero usable questions
    #[error("no questions available for this selection")]
    EmptyPool,

    /// The results history file exists but cannot be parsed
    #[error("results history at {path:?} is corrupted: {message}")]
    CorruptHistory {
        /// Path of the offending history file
        path: PathBuf,
        /// Parse failure detail
        message: String,
    },

    /// An answer was submitted to a session that already completed
    #[error("the exam session is already complete")]
    SessionFinished,

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl QuizError {
    /// Check if this error is recoverable (the user can pick another file or
    /// add more questions)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, QuizError::Format(_) | QuizError::EmptyPool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pool_is_recoverable() {
        assert!(QuizError::EmptyPool.is_recoverable());
        assert!(QuizError::Format("bad".into()).is_recoverable());
    }

    #[test]
    fn corrupt_history_is_not_recoverable() {
        let err = QuizError::CorruptHistory { path: PathBuf::from("results.json"), message: "x".into() };
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("results.json"));
    }
}
