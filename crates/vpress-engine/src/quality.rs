//! Frame quality heuristic.

use vpress_models::CompressionSettings;

/// Estimate visual quality (0..=100) from the encoder and CRF.
///
/// This is a heuristic, not a measurement: per-codec slopes map the CRF scale
/// onto a common 0..100 axis. No decoded-frame metric is computed.
pub fn estimate_frame_quality(settings: &CompressionSettings) -> f64 {
    let crf = settings.crf.map(f64::from).unwrap_or(23.0);

    let slope = match settings.codec.as_deref() {
        Some("libx264") => 1.96,
        Some("libx265") => 1.76,
        Some("libvpx-vp9") => 1.58,
        _ => return 0.0,
    };

    (100.0 - crf * slope).clamp(0.0, 100.0)
}
