//! Probed video file metadata.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Immutable descriptor of a source video file, produced by the probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoFile {
    /// Full path to the file
    pub path: PathBuf,
    /// Size in bytes
    pub size_bytes: u64,
    /// Container format (mp4, mkv, ...)
    pub container_format: String,
    /// Duration in seconds
    pub duration_seconds: f64,
    /// Overall bitrate in bits/second
    pub overall_bitrate_bps: u64,
    /// The primary video stream
    pub video: VideoStreamInfo,
    /// Audio streams in probe order
    pub audio_streams: Vec<AudioStreamInfo>,
    /// Free-form container tags
    pub metadata: BTreeMap<String, String>,
}

/// Information about the video stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoStreamInfo {
    /// Codec name (h264, hevc, ...)
    pub codec: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Frame rate in frames per second
    pub fps: f64,
    /// Video stream bitrate in bits/second
    pub bitrate_bps: u64,
    /// Pixel format (yuv420p, ...)
    pub pixel_format: String,
    /// Color space
    pub color_space: String,
    /// Whether the stream carries HDR transfer characteristics
    pub is_hdr: bool,
    /// Whether the stream uses B-frames
    pub has_b_frames: bool,
    /// Codec profile string
    pub profile_level: String,
}

/// Information about one audio stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioStreamInfo {
    /// Stream index within the container
    pub index: u32,
    /// Codec name (aac, opus, ...)
    pub codec: String,
    /// Channel count
    pub channels: u32,
    /// Sample rate in Hz
    pub sample_rate_hz: u32,
    /// Bitrate in bits/second
    pub bitrate_bps: u64,
    /// Language tag, empty when absent
    pub language: String,
}

impl VideoFile {
    /// Resolution as a "WxH" string, the form the cache indexes on.
    pub fn resolution(&self) -> String {
        format!("{}x{}", self.video.width, self.video.height)
    }

    /// First audio stream, if any.
    pub fn primary_audio(&self) -> Option<&AudioStreamInfo> {
        self.audio_streams.first()
    }
}
