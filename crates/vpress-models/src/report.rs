//! The final user-facing report record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::VideoAnalysis;
use crate::result::CompressionResult;
use crate::video::VideoFile;

/// Read-only record combining the source metadata, analysis and result,
/// plus derived scores and human-readable tips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Probed source metadata
    pub original_video: VideoFile,
    /// Content analysis the run was based on
    pub analysis: VideoAnalysis,
    /// Compression outcome
    pub result: CompressionResult,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished
    pub completed_at: DateTime<Utc>,
    /// Overall score 0..=100
    pub performance_score: f64,
    /// Human description of the visual quality tier
    pub quality_estimate: String,
    /// Estimated transfer time saved at 10 Mbps, in seconds
    pub time_saved_seconds: f64,
    /// Storage saved in megabytes
    pub storage_saved_mb: f64,
    /// Ordered optimization tips
    pub tips: Vec<String>,
}
