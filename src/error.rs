//! Error types for the dentfaq application.

use dentfaq_search::SearchError;

/// Top-level error type for the application layer.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration file missing, unreadable or invalid.
    #[error("config error: {0}")]
    Config(String),

    /// Knowledge-base search error.
    #[error("search error: {0}")]
    Search(#[from] SearchError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, AppError>;
