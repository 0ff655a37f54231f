//! Encoder settings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Compression settings handed to the encoder.
///
/// Every field is optional; absent options are simply not passed to FFmpeg.
/// The typed record is the unit of truth inside the pipeline; conversion to
/// an argv happens only at the FFmpeg boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompressionSettings {
    /// Encoder id: "libx264", "libx265" or "libvpx-vp9"
    pub codec: Option<String>,
    /// Encoder preset, ultrafast..veryslow
    pub preset: Option<String>,
    /// Constant Rate Factor
    pub crf: Option<u8>,
    /// Codec profile ("main", "high", "main10", ...)
    pub profile: Option<String>,
    /// Codec level ("3.1", "4.1", ...)
    pub level: Option<String>,
    /// Encoder tune ("film", "animation", "zerolatency", ...)
    pub tune: Option<String>,
    /// x265-only parameter string
    pub x265_params: Option<String>,
    /// Pixel format ("yuv420p", "yuv420p10le")
    pub pix_fmt: Option<String>,
    /// Target video bitrate, e.g. "2000k"
    pub bitrate: Option<String>,
    /// Audio codec: "copy" or a re-encode id such as "aac"
    pub audio_codec: Option<String>,
    /// Audio bitrate, e.g. "128k"
    pub audio_bitrate: Option<String>,
    /// Encoder thread count
    pub threads: Option<u32>,
    /// Keyframe forcing expression, e.g. "expr:eq(n,0)"
    pub force_key_frames: Option<String>,
}

impl CompressionSettings {
    /// Whether the selected encoder is libx265.
    pub fn is_x265(&self) -> bool {
        self.codec.as_deref() == Some("libx265")
    }

    /// Whether the selected encoder is libvpx-vp9.
    pub fn is_vp9(&self) -> bool {
        self.codec.as_deref() == Some("libvpx-vp9")
    }
}

/// Speed/effort preset selected on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeedPreset {
    /// Prioritize encode speed
    Fast,
    /// Use the analyzer's settings as-is
    #[default]
    Balanced,
    /// Prioritize compression efficiency
    Thorough,
}

impl fmt::Display for SpeedPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SpeedPreset::Fast => "fast",
            SpeedPreset::Balanced => "balanced",
            SpeedPreset::Thorough => "thorough",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for SpeedPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fast" => Ok(SpeedPreset::Fast),
            "balanced" => Ok(SpeedPreset::Balanced),
            "thorough" => Ok(SpeedPreset::Thorough),
            other => Err(format!(
                "preset must be one of: fast, balanced, thorough (got {other})"
            )),
        }
    }
}
