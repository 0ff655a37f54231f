//! Engine error types.

use thiserror::Error;

use vpress_media::MediaError;

pub type EngineResult<T> = Result<T, EngineError>;

/// Errors from the compression engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Segment {index} failed: {source}")]
    Segment {
        index: usize,
        #[source]
        source: MediaError,
    },

    #[error("Merge failed: {0}")]
    Merge(#[source] MediaError),

    #[error("Worker panicked: {0}")]
    WorkerPanic(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
