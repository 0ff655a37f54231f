//! Content analysis and encoder settings derivation.
//!
//! The analyzer classifies a probed video (content type, motion, spatial
//! complexity, HDR, resolution class), derives a target codec and bitrate
//! from the classification, and turns an analysis plus a 1..=5 quality level
//! into concrete encoder settings.

mod analyzer;
mod settings;

pub use analyzer::ContentAnalyzer;
pub use settings::derive_settings;
