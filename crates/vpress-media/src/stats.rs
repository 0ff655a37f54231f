//! Signal-statistics helpers backing the content analyzer.
//!
//! Both helpers run FFmpeg with a filter graph and `-f null -`, then scan the
//! log output. Failures here are always recoverable for the caller: the
//! analyzer falls back to content-type defaults.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{MediaError, MediaResult};
use crate::tools::FfmpegTools;

/// Source of the measured signals the analyzer consumes.
///
/// The trait seam keeps `analyze()` deterministic and lets tests substitute
/// fixed measurements for the FFmpeg-backed implementation.
#[async_trait]
pub trait SignalProbe: Send + Sync {
    /// Count scene changes above `threshold` (0.0..1.0).
    async fn scene_change_count(&self, path: &Path, threshold: f64) -> MediaResult<u32>;

    /// Average I-frame variance as a complexity measure.
    async fn frame_complexity(&self, path: &Path) -> MediaResult<f64>;
}

/// FFmpeg-backed [`SignalProbe`].
#[derive(Debug, Clone)]
pub struct FfmpegSignalProbe {
    tools: FfmpegTools,
}

impl FfmpegSignalProbe {
    pub fn new(tools: FfmpegTools) -> Self {
        Self { tools }
    }

    async fn run_filter(&self, path: &Path, filter: &str) -> MediaResult<String> {
        let output = Command::new(self.tools.ffmpeg())
            .arg("-i")
            .arg(path)
            .args(["-vf", filter, "-f", "null", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            return Err(MediaError::ffmpeg_failed(
                format!("filter '{filter}' failed on {}", path.display()),
                String::from_utf8_lossy(&output.stderr).into_owned(),
                output.status.code(),
            ));
        }

        // metadata=print writes to the log stream
        let mut text = String::from_utf8_lossy(&output.stderr).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stdout));
        Ok(text)
    }
}

#[async_trait]
impl SignalProbe for FfmpegSignalProbe {
    async fn scene_change_count(&self, path: &Path, threshold: f64) -> MediaResult<u32> {
        let filter = format!("select='gt(scene,{threshold})',metadata=print");
        let output = self.run_filter(path, &filter).await?;
        let count = count_scene_changes(&output, threshold);
        debug!(path = %path.display(), count, "Scene detection completed");
        Ok(count)
    }

    async fn frame_complexity(&self, path: &Path) -> MediaResult<f64> {
        let output = self
            .run_filter(path, "select='eq(pict_type,I)',signalstats,metadata=print")
            .await?;
        let complexity = average_variance(&output)?;
        debug!(path = %path.display(), complexity, "Frame complexity measured");
        Ok(complexity)
    }
}

/// Count scene scores at or above `threshold` in metadata output.
///
/// The frame header line (`... pts_time:12.4`) and the score line
/// (`lavfi.scene_score=0.52`) may arrive separately, so the scan tracks the
/// most recent timestamp and counts when a qualifying score appears.
fn count_scene_changes(output: &str, threshold: f64) -> u32 {
    let mut count = 0u32;
    let mut saw_timestamp = false;

    for line in output.lines() {
        if extract_float_after(line, "pts_time:").is_some() {
            saw_timestamp = true;
        }
        let score = extract_float_after(line, "scene_score=")
            .or_else(|| extract_float_after(line, "scene:"));
        if let Some(score) = score {
            if score >= threshold && saw_timestamp {
                count += 1;
                saw_timestamp = false;
            }
        }
    }

    count
}

/// Average the `variance:`-tagged values in signalstats output.
fn average_variance(output: &str) -> MediaResult<f64> {
    let mut total = 0.0;
    let mut samples = 0u32;

    for line in output.lines() {
        if let Some(value) = extract_float_after(line, "variance:")
            .or_else(|| extract_float_after(line, "variance="))
        {
            total += value;
            samples += 1;
        }
    }

    if samples == 0 {
        return Err(MediaError::ffmpeg_failed(
            "no frames analyzed for complexity",
            "",
            None,
        ));
    }
    Ok(total / samples as f64)
}

/// Parse the float immediately following `key` on `line`, if present.
fn extract_float_after(line: &str, key: &str) -> Option<f64> {
    let start = line.find(key)? + key.len();
    let rest = line[start..].trim_start();
    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}
