//! Stream-copy segmenting.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::{MediaError, MediaResult};
use crate::tools::FfmpegTools;

/// Split `input` into `n` time-based segments of `segment_duration` seconds.
///
/// Segments are stream-copied, never re-encoded, so splitting is fast and the
/// split+merge pair is lossless relative to the source container. Boundaries
/// land on keyframes rather than exact timestamps; the engine compensates by
/// forcing an IDR at the start of each re-encoded segment.
pub async fn split_segments(
    tools: &FfmpegTools,
    input: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    segment_duration: f64,
    n: usize,
) -> MediaResult<Vec<PathBuf>> {
    let input = input.as_ref();
    let out_dir = out_dir.as_ref();
    let mut segments = Vec::with_capacity(n);

    for i in 0..n {
        let start = i as f64 * segment_duration;
        let out_path = out_dir.join(format!("segment_{i:04}.mp4"));
        debug!(segment = i, start, "Splitting segment");

        let output = Command::new(tools.ffmpeg())
            .arg("-ss")
            .arg(format!("{start:.3}"))
            .arg("-i")
            .arg(input)
            .arg("-t")
            .arg(format!("{segment_duration:.3}"))
            .args(["-c", "copy", "-avoid_negative_ts", "1", "-y"])
            .arg(&out_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            return Err(MediaError::ffmpeg_failed(
                format!("failed to split segment {i} of {}", input.display()),
                String::from_utf8_lossy(&output.stderr).into_owned(),
                output.status.code(),
            ));
        }

        segments.push(out_path);
    }

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn split_fails_cleanly_without_ffmpeg() {
        let tools = FfmpegTools::from_paths("/nonexistent/ffmpeg", "/nonexistent/ffprobe");
        let dir = tempfile::tempdir().unwrap();
        let err = split_segments(&tools, "in.mp4", dir.path(), 10.0, 2)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Io(_)));
    }
}
