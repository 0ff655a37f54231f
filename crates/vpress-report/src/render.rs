//! Plain-text report rendering.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::debug;

use vpress_models::Report;

/// Render the report as a human-readable text block.
pub fn render_report(report: &Report) -> String {
    let mut out = String::new();
    let result = &report.result;
    let mb = 1024.0 * 1024.0;

    let _ = writeln!(out, "COMPRESSION REPORT");
    let _ = writeln!(out, "=======================================");
    let _ = writeln!(out);
    let _ = writeln!(out, "FILES:");
    let _ = writeln!(out, "  Input:  {}", result.input_path.display());
    let _ = writeln!(out, "  Output: {}", result.output_path.display());
    let _ = writeln!(out);
    let _ = writeln!(out, "VIDEO DETAILS:");
    let _ = writeln!(
        out,
        "  Resolution: {}x{}",
        report.original_video.video.width, report.original_video.video.height
    );
    let _ = writeln!(
        out,
        "  Duration:   {:.2} seconds",
        report.original_video.duration_seconds
    );
    let _ = writeln!(
        out,
        "  Content:    {}, {} motion",
        report.analysis.content_type, report.analysis.motion_complexity
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "COMPRESSION RESULTS:");
    let _ = writeln!(
        out,
        "  Original Size:    {:.2} MB",
        result.original_size_bytes as f64 / mb
    );
    let _ = writeln!(
        out,
        "  Compressed Size:  {:.2} MB",
        result.compressed_size_bytes as f64 / mb
    );
    let _ = writeln!(
        out,
        "  Space Saved:      {:.2} MB ({:.1}%)",
        result.saved_bytes as f64 / mb,
        result.saved_percent
    );
    let _ = writeln!(
        out,
        "  Compression Ratio: {:.2}:1",
        result.compression_ratio
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "PERFORMANCE:");
    let _ = writeln!(
        out,
        "  Processing Time:  {:.0}s",
        result.processing_duration.as_secs_f64()
    );
    let _ = writeln!(
        out,
        "  Quality Estimate: {} ({:.1}/100)",
        report.quality_estimate, result.average_frame_quality
    );
    let _ = writeln!(
        out,
        "  Overall Score:    {:.1}/100",
        report.performance_score
    );
    if report.time_saved_seconds > 0.0 {
        let _ = writeln!(
            out,
            "  Est. Transfer Time Saved: {:.1} seconds at 10 Mbps",
            report.time_saved_seconds
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "ENCODING SETTINGS:");
    let s = &result.settings_used;
    if let Some(codec) = &s.codec {
        let _ = writeln!(out, "  codec: {codec}");
    }
    if let Some(crf) = s.crf {
        let _ = writeln!(out, "  crf: {crf}");
    }
    if let Some(preset) = &s.preset {
        let _ = writeln!(out, "  preset: {preset}");
    }
    if let Some(tune) = &s.tune {
        let _ = writeln!(out, "  tune: {tune}");
    }
    if let Some(pix_fmt) = &s.pix_fmt {
        let _ = writeln!(out, "  pix_fmt: {pix_fmt}");
    }
    if let Some(bitrate) = &s.bitrate {
        let _ = writeln!(out, "  bitrate: {bitrate}");
    }
    if let Some(audio) = &s.audio_codec {
        let _ = writeln!(out, "  audio_codec: {audio}");
    }

    if !report.tips.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "OPTIMIZATION TIPS:");
        for tip in &report.tips {
            let _ = writeln!(out, "  - {tip}");
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Report generated on {}",
        report.completed_at.format("%Y-%m-%d %H:%M:%S")
    );

    out
}

/// Path of the report file for a given output: `<output_basename>_report.txt`
/// alongside the output.
pub fn report_path_for(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let name = format!("{stem}_report.txt");
    match output.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

/// Write the rendered report next to the output file; returns its path.
pub async fn save_report(report: &Report) -> std::io::Result<PathBuf> {
    let path = report_path_for(&report.result.output_path);
    tokio::fs::write(&path, render_report(report)).await?;
    debug!(report = %path.display(), "Saved report");
    Ok(path)
}
