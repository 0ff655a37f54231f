//! FFprobe metadata extraction.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::process::Stdio;

use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use vpress_models::{AudioStreamInfo, VideoFile, VideoStreamInfo};

use crate::error::{MediaError, MediaResult};
use crate::tools::FfmpegTools;

/// FFprobe JSON output shape. Every field is optional; anything the probe
/// does not report parses to a zero value downstream.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    size: Option<String>,
    bit_rate: Option<String>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    index: Option<u32>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    bit_rate: Option<String>,
    pix_fmt: Option<String>,
    color_space: Option<String>,
    color_transfer: Option<String>,
    profile: Option<String>,
    channels: Option<u32>,
    sample_rate: Option<String>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

/// Probe a video file.
pub async fn probe_file(tools: &FfmpegTools, path: impl AsRef<Path>) -> MediaResult<VideoFile> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    let output = Command::new(tools.ffprobe())
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| MediaError::ProbeLaunch(e.to_string()))?;

    if !output.status.success() {
        return Err(MediaError::ProbeLaunch(format!(
            "ffprobe exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    let file = parse_probe_output(&output.stdout, path)?;
    debug!(
        path = %path.display(),
        duration = file.duration_seconds,
        resolution = %file.resolution(),
        "Probe completed"
    );
    Ok(file)
}

/// Parse raw ffprobe JSON into a [`VideoFile`].
///
/// Factored out of [`probe_file`] so the parser can be exercised against
/// synthetic probe output.
pub fn parse_probe_output(json: &[u8], path: &Path) -> MediaResult<VideoFile> {
    let probe: FfprobeOutput = serde_json::from_slice(json)?;

    let video_stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| MediaError::NoVideoStream(path.to_path_buf()))?;

    let video = VideoStreamInfo {
        codec: video_stream.codec_name.clone().unwrap_or_default(),
        width: video_stream.width.unwrap_or(0),
        height: video_stream.height.unwrap_or(0),
        fps: video_stream
            .r_frame_rate
            .as_deref()
            .map(parse_frame_rate)
            .unwrap_or(0.0),
        bitrate_bps: parse_u64(&video_stream.bit_rate),
        pixel_format: video_stream.pix_fmt.clone().unwrap_or_default(),
        color_space: video_stream.color_space.clone().unwrap_or_default(),
        is_hdr: is_hdr_stream(video_stream),
        has_b_frames: has_b_frames(video_stream),
        profile_level: video_stream.profile.clone().unwrap_or_default(),
    };

    let audio_streams = probe
        .streams
        .iter()
        .filter(|s| s.codec_type.as_deref() == Some("audio"))
        .map(|s| AudioStreamInfo {
            index: s.index.unwrap_or(0),
            codec: s.codec_name.clone().unwrap_or_default(),
            channels: s.channels.unwrap_or(0),
            sample_rate_hz: s
                .sample_rate
                .as_deref()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            bitrate_bps: parse_u64(&s.bit_rate),
            language: s.tags.get("language").cloned().unwrap_or_default(),
        })
        .collect();

    let metadata: BTreeMap<String, String> = probe
        .format
        .tags
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    Ok(VideoFile {
        path: path.to_path_buf(),
        size_bytes: parse_u64(&probe.format.size),
        container_format: path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default(),
        duration_seconds: probe
            .format
            .duration
            .as_deref()
            .and_then(|d| d.parse().ok())
            .unwrap_or(0.0),
        overall_bitrate_bps: parse_u64(&probe.format.bit_rate),
        video,
        audio_streams,
        metadata,
    })
}

/// Parse a rational frame rate string such as "30000/1001".
///
/// A zero denominator (or anything unparsable) yields 0.
fn parse_frame_rate(s: &str) -> f64 {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = match num.parse() {
            Ok(v) => v,
            Err(_) => return 0.0,
        };
        let den: f64 = match den.parse() {
            Ok(v) => v,
            Err(_) => return 0.0,
        };
        if den == 0.0 {
            return 0.0;
        }
        return num / den;
    }
    s.parse().unwrap_or(0.0)
}

fn parse_u64(value: &Option<String>) -> u64 {
    value.as_deref().and_then(|v| v.parse().ok()).unwrap_or(0)
}

/// HDR is inferred from the transfer characteristics, reported either as a
/// stream field or a stream tag.
fn is_hdr_stream(stream: &FfprobeStream) -> bool {
    let transfer = stream
        .color_transfer
        .as_deref()
        .or_else(|| stream.tags.get("color_transfer").map(String::as_str));
    match transfer {
        Some(t) => {
            let t = t.to_lowercase();
            t == "smpte2084" || t == "arib-std-b67"
        }
        None => false,
    }
}

/// Profiles carrying B-frames almost always have "High" in the name.
fn has_b_frames(stream: &FfprobeStream) -> bool {
    stream
        .profile
        .as_deref()
        .map(|p| p.to_lowercase().contains("high"))
        .unwrap_or(false)
}
