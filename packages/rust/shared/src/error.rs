//! Error types for TutorHub.
//!
//! Library crates use [`TutorHubError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all TutorHub operations.
#[derive(Debug, thiserror::Error)]
pub enum TutorHubError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while talking to the CMS or profile API.
    #[error("network error: {0}")]
    Network(String),

    /// JSON decoding error on an upstream response or local file.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// The content payload does not have the shape the blog normalizer needs.
    #[error("invalid content format: {message}")]
    InvalidContent { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad URL, out-of-range setting, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, TutorHubError>;

impl TutorHubError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create an invalid-content error from any displayable message.
    pub fn invalid_content(msg: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
