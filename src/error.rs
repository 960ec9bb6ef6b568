//! Error types for sift.

use crate::llm::LlmError;
use sift_search::SearchError;

/// Top-level error type for a refinement session.
#[derive(Debug, thiserror::Error)]
pub enum SiftError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Completion provider error.
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Search or cache error.
    #[error("search error: {0}")]
    Search(#[from] SearchError),

    /// Structured model output could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, SiftError>;
