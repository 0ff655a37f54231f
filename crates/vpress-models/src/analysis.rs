//! Content classification results.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::video::VideoFile;

/// Detected category of video content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    Unknown,
    Animation,
    Screencast,
    Gaming,
    LiveAction,
    SportsAction,
    Documentary,
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContentType::Unknown => "Unknown",
            ContentType::Animation => "Animation",
            ContentType::Screencast => "Screencast",
            ContentType::Gaming => "Gaming",
            ContentType::LiveAction => "Live Action",
            ContentType::SportsAction => "Sports Action",
            ContentType::Documentary => "Documentary",
        };
        f.write_str(s)
    }
}

/// Level of motion in the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MotionComplexity {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl fmt::Display for MotionComplexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MotionComplexity::Low => "Low",
            MotionComplexity::Medium => "Medium",
            MotionComplexity::High => "High",
            MotionComplexity::VeryHigh => "Very High",
        };
        f.write_str(s)
    }
}

/// Results of content analysis for one video file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoAnalysis {
    /// The file this analysis describes
    pub video_file: VideoFile,
    /// Detected content category
    pub content_type: ContentType,
    /// Motion complexity level
    pub motion_complexity: MotionComplexity,
    /// Number of detected scene changes
    pub scene_changes: u32,
    /// Average I-frame variance
    pub frame_complexity: f64,
    /// Detail level combining resolution and frame complexity
    pub spatial_complexity: f64,
    /// Height >= 720
    pub is_hd: bool,
    /// Height >= 2160 or width >= 3840
    pub is_uhd: bool,
    /// Recommended codec family: "h264", "hevc" or "vp9"
    pub recommended_codec: String,
    /// Optimal bitrate in bits/second, clamped to [500_000, 15_000_000]
    pub optimal_bitrate_bps: u64,
    /// Estimated compression potential in percent, 0..=95
    pub compression_potential_percent: u8,
}
