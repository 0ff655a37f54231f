//! Compression outcome.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::settings::CompressionSettings;

/// Outcome of one compression run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionResult {
    /// Input file path
    pub input_path: PathBuf,
    /// Output file path
    pub output_path: PathBuf,
    /// Input size in bytes
    pub original_size_bytes: u64,
    /// Output size in bytes
    pub compressed_size_bytes: u64,
    /// original / compressed
    pub compression_ratio: f64,
    /// original - compressed
    pub saved_bytes: i64,
    /// Saved share of the original, in percent
    pub saved_percent: f64,
    /// Wall-clock processing time
    pub processing_duration: Duration,
    /// Heuristic frame quality estimate, 0..=100
    pub average_frame_quality: f64,
    /// The settings the encode actually ran with
    pub settings_used: CompressionSettings,
    /// Error description when the run failed
    pub error: Option<String>,
}

impl CompressionResult {
    /// Derive ratio and savings fields from the two sizes.
    pub fn finalize_sizes(&mut self) {
        self.saved_bytes = self.original_size_bytes as i64 - self.compressed_size_bytes as i64;
        if self.compressed_size_bytes > 0 {
            self.compression_ratio =
                self.original_size_bytes as f64 / self.compressed_size_bytes as f64;
        }
        if self.original_size_bytes > 0 {
            self.saved_percent =
                self.saved_bytes as f64 / self.original_size_bytes as f64 * 100.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finalize_derives_ratio_and_savings() {
        let mut result = CompressionResult {
            input_path: PathBuf::from("in.mp4"),
            output_path: PathBuf::from("out.mp4"),
            original_size_bytes: 1000,
            compressed_size_bytes: 250,
            compression_ratio: 0.0,
            saved_bytes: 0,
            saved_percent: 0.0,
            processing_duration: Duration::from_secs(1),
            average_frame_quality: 0.0,
            settings_used: CompressionSettings::default(),
            error: None,
        };
        result.finalize_sizes();
        assert_eq!(result.saved_bytes, 750);
        assert!((result.compression_ratio - 4.0).abs() < f64::EPSILON);
        assert!((result.saved_percent - 75.0).abs() < f64::EPSILON);
    }
}
