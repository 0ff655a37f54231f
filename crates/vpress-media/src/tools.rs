//! FFmpeg binary discovery.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Resolved paths of the external binaries.
///
/// Discovered once at startup and passed into every component that spawns a
/// process, so nothing in the pipeline consults the environment on its own.
#[derive(Debug, Clone)]
pub struct FfmpegTools {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl FfmpegTools {
    /// Locate `ffmpeg` and `ffprobe` on the PATH.
    pub fn discover() -> MediaResult<Self> {
        let ffmpeg = which::which("ffmpeg").map_err(|_| MediaError::ToolNotFound("ffmpeg"))?;
        let ffprobe = which::which("ffprobe").map_err(|_| MediaError::ToolNotFound("ffprobe"))?;
        debug!(ffmpeg = %ffmpeg.display(), ffprobe = %ffprobe.display(), "Resolved FFmpeg tools");
        Ok(Self { ffmpeg, ffprobe })
    }

    /// Build from explicit paths (tests, unusual installs).
    pub fn from_paths(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    /// Path of the encoder binary.
    pub fn ffmpeg(&self) -> &Path {
        &self.ffmpeg
    }

    /// Path of the probe binary.
    pub fn ffprobe(&self) -> &Path {
        &self.ffprobe
    }
}
