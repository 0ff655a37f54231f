//! Cache error types.

use thiserror::Error;

pub type CacheResult<T> = Result<T, CacheError>;

/// Errors from the analysis cache.
///
/// Callers on the compression path treat all of these as non-fatal: a failed
/// read is a miss, a failed write is logged and dropped. Only the explicit
/// cache subcommand surfaces them.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("Cache serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
