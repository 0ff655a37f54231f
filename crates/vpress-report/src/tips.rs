//! Optimization tips derived from the run.

use vpress_models::{CompressionResult, ContentType, MotionComplexity, VideoAnalysis, VideoFile};

/// Produce ordered, human-readable tips for the report.
pub fn generate_tips(
    original: &VideoFile,
    analysis: &VideoAnalysis,
    result: &CompressionResult,
) -> Vec<String> {
    let mut tips = Vec::new();

    if result.saved_percent < 10.0 {
        tips.push(
            "This video was already well optimized or contains content that doesn't compress well."
                .to_string(),
        );
        if analysis.recommended_codec == "h264" {
            tips.push(
                "Try using HEVC (H.265) codec for potentially better compression, although it may reduce compatibility."
                    .to_string(),
            );
        }
    }

    match analysis.content_type {
        ContentType::Screencast => {
            tips.push(
                "Screencasts often benefit from higher CRF values. Consider using CRF 28-32 if quality is acceptable."
                    .to_string(),
            );
        }
        ContentType::Animation => {
            tips.push(
                "For animation, consistent quality encoding (CRF) typically works better than targeting a specific bitrate."
                    .to_string(),
            );
        }
        ContentType::LiveAction
            if matches!(
                analysis.motion_complexity,
                MotionComplexity::High | MotionComplexity::VeryHigh
            ) =>
        {
            tips.push(
                "High-motion content requires higher bitrates to maintain quality. Consider a higher quality setting for critical content."
                    .to_string(),
            );
        }
        _ => {}
    }

    if let Some(audio) = original.primary_audio() {
        if audio.bitrate_bps > 192_000 {
            tips.push(
                "Audio is using a high bitrate. Consider using 128kbps AAC for most content, or 192kbps for music videos."
                    .to_string(),
            );
        }
    }

    if original.video.height >= 1080 && result.saved_percent < 30.0 {
        tips.push(
            "Consider downscaling to 720p if this video doesn't require full HD resolution."
                .to_string(),
        );
    }

    if original.duration_seconds < 60.0 && result.saved_percent < 20.0 {
        tips.push(
            "Short videos often have less compression potential due to fewer redundant frames."
                .to_string(),
        );
    }

    tips
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use std::time::Duration;
    use vpress_models::{AudioStreamInfo, CompressionSettings, VideoStreamInfo};

    fn fixture(
        content_type: ContentType,
        height: u32,
        duration: f64,
        audio_bitrate: u64,
        saved_percent: f64,
    ) -> (VideoFile, VideoAnalysis, CompressionResult) {
        let video_file = VideoFile {
            path: PathBuf::from("/v/in.mp4"),
            size_bytes: 1_000_000,
            container_format: "mp4".to_string(),
            duration_seconds: duration,
            overall_bitrate_bps: 5_000_000,
            video: VideoStreamInfo {
                codec: "h264".to_string(),
                width: 1920,
                height,
                fps: 30.0,
                ..Default::default()
            },
            audio_streams: vec![AudioStreamInfo {
                index: 1,
                codec: "aac".to_string(),
                channels: 2,
                sample_rate_hz: 48_000,
                bitrate_bps: audio_bitrate,
                language: String::new(),
            }],
            metadata: BTreeMap::new(),
        };
        let analysis = VideoAnalysis {
            video_file: video_file.clone(),
            content_type,
            motion_complexity: MotionComplexity::Medium,
            scene_changes: 5,
            frame_complexity: 300.0,
            spatial_complexity: 1.0,
            is_hd: true,
            is_uhd: false,
            recommended_codec: "h264".to_string(),
            optimal_bitrate_bps: 3_000_000,
            compression_potential_percent: 40,
        };
        let result = CompressionResult {
            input_path: video_file.path.clone(),
            output_path: PathBuf::from("/v/out.mp4"),
            original_size_bytes: 1_000_000,
            compressed_size_bytes: 1_000_000,
            compression_ratio: 1.0,
            saved_bytes: 0,
            saved_percent,
            processing_duration: Duration::from_secs(10),
            average_frame_quality: 60.0,
            settings_used: CompressionSettings::default(),
            error: None,
        };
        (video_file, analysis, result)
    }

    #[test]
    fn poor_savings_suggest_codec_change() {
        let (vf, analysis, result) = fixture(ContentType::LiveAction, 720, 300.0, 128_000, 5.0);
        let tips = generate_tips(&vf, &analysis, &result);
        assert!(tips[0].contains("already well optimized"));
        assert!(tips[1].contains("HEVC"));
    }

    #[test]
    fn screencast_tip_present() {
        let (vf, analysis, result) = fixture(ContentType::Screencast, 720, 300.0, 128_000, 50.0);
        let tips = generate_tips(&vf, &analysis, &result);
        assert!(tips.iter().any(|t| t.contains("CRF 28-32")));
    }

    #[test]
    fn high_audio_bitrate_tip() {
        let (vf, analysis, result) = fixture(ContentType::LiveAction, 720, 300.0, 320_000, 50.0);
        let tips = generate_tips(&vf, &analysis, &result);
        assert!(tips.iter().any(|t| t.contains("128kbps AAC")));
    }

    #[test]
    fn downscale_and_short_video_tips() {
        let (vf, analysis, result) = fixture(ContentType::Documentary, 1080, 45.0, 128_000, 15.0);
        let tips = generate_tips(&vf, &analysis, &result);
        assert!(tips.iter().any(|t| t.contains("720p")));
        assert!(tips.iter().any(|t| t.contains("Short videos")));
    }

    #[test]
    fn good_runs_stay_quiet() {
        let (vf, analysis, result) = fixture(ContentType::LiveAction, 720, 300.0, 128_000, 55.0);
        assert!(generate_tips(&vf, &analysis, &result).is_empty());
    }
}
