//! Error types for the dentfaq-search crate.
//!
//! Messages are stable strings suitable for logs and for surfacing to the
//! caller. Query text never appears in an error message.

use std::sync::Arc;

/// Errors that can occur while loading a corpus or running a search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The corpus source could not be fetched.
    #[error("corpus load error: {0}")]
    Load(String),

    /// The corpus payload was not a JSON array of entries.
    #[error("corpus parse error: {0}")]
    Parse(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Invalid stopword / synonym table.
    #[error("lexicon error: {0}")]
    Lexicon(String),

    /// I/O error while reading a corpus or lexicon file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<Arc<SearchError>> for SearchError {
    /// Recover an error shared between callers that awaited the same
    /// in-flight corpus load.
    fn from(shared: Arc<SearchError>) -> Self {
        Arc::try_unwrap(shared).unwrap_or_else(|shared| Self::Load(shared.to_string()))
    }
}

/// Convenience type alias for dentfaq-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
