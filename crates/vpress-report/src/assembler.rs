//! Report assembly.

use chrono::{DateTime, Utc};

use vpress_models::{CompressionResult, Report, VideoAnalysis, VideoFile};

use crate::tips::generate_tips;

/// Assumed transfer speed for the time-saved estimate, megabits/second.
const TRANSFER_MBPS: f64 = 10.0;

/// Combine the source metadata, analysis and result into the final report.
pub fn assemble_report(
    original_video: VideoFile,
    analysis: VideoAnalysis,
    result: CompressionResult,
    started_at: DateTime<Utc>,
) -> Report {
    let saved_mb = result.saved_bytes.max(0) as f64 / (1024.0 * 1024.0);
    let time_saved_seconds = saved_mb * 8.0 / TRANSFER_MBPS;

    let performance_score = performance_score(&original_video, &result);
    let quality_estimate = quality_tier(result.average_frame_quality).to_string();
    let tips = generate_tips(&original_video, &analysis, &result);

    Report {
        original_video,
        analysis,
        result,
        started_at,
        completed_at: Utc::now(),
        performance_score,
        quality_estimate,
        time_saved_seconds,
        storage_saved_mb: saved_mb,
        tips,
    }
}

/// Rate the run 0..=100 from savings, quality and throughput.
fn performance_score(original: &VideoFile, result: &CompressionResult) -> f64 {
    let mut score = 50.0;

    // Space saved contributes up to 40 points
    score += (result.saved_percent / 100.0) * 40.0;

    // Quality contributes up to 30 points
    score += (result.average_frame_quality / 100.0) * 30.0;

    // Faster-than-realtime processing earns up to 10 points, capped at 10x
    let elapsed = result.processing_duration.as_secs_f64();
    if elapsed > 0.0 {
        let realtime_ratio = original.duration_seconds / elapsed;
        if realtime_ratio > 1.0 {
            score += ((realtime_ratio - 1.0) / 9.0).min(1.0) * 10.0;
        }
    }

    score.clamp(0.0, 100.0)
}

/// Map a 0..=100 quality score onto a human description.
fn quality_tier(quality: f64) -> &'static str {
    if quality >= 90.0 {
        "Excellent - Visually identical to the original"
    } else if quality >= 80.0 {
        "Very Good - Differences barely noticeable"
    } else if quality >= 70.0 {
        "Good - Minor visible differences"
    } else if quality >= 60.0 {
        "Acceptable - Visible differences but good for most purposes"
    } else if quality >= 50.0 {
        "Medium - Noticeable quality loss"
    } else if quality >= 40.0 {
        "Low - Significant quality loss"
    } else {
        "Poor - Heavy compression artifacts"
    }
}
