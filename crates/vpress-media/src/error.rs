//! Error types for media operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while driving the external binaries.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("{0} not found in PATH")]
    ToolNotFound(&'static str),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to launch ffprobe: {0}")]
    ProbeLaunch(String),

    #[error("Failed to parse ffprobe output: {0}")]
    ProbeJson(#[from] serde_json::Error),

    #[error("No video stream found in {0}")]
    NoVideoStream(PathBuf),

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: String,
        exit_code: Option<i32>,
    },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Create an FFmpeg failure error with the captured stderr attached.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: impl Into<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr: stderr.into(),
            exit_code,
        }
    }
}
