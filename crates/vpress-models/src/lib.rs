//! Shared data models for the vpress compression pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Probed video metadata ([`VideoFile`] and its stream records)
//! - Content analysis results ([`VideoAnalysis`] and its enums)
//! - Encoder settings ([`CompressionSettings`])
//! - Compression outcomes ([`CompressionResult`])
//! - The final user-facing [`Report`]

pub mod analysis;
pub mod report;
pub mod result;
pub mod settings;
pub mod video;

pub use analysis::{ContentType, MotionComplexity, VideoAnalysis};
pub use report::Report;
pub use result::CompressionResult;
pub use settings::{CompressionSettings, SpeedPreset};
pub use video::{AudioStreamInfo, VideoFile, VideoStreamInfo};
