//! Video content classification.

use std::sync::Arc;

use tracing::{debug, info, warn};

use vpress_media::SignalProbe;
use vpress_models::{
    CompressionSettings, ContentType, MotionComplexity, VideoAnalysis, VideoFile,
};

use crate::settings::derive_settings;

/// Scene-select threshold used for scene change counting.
const SCENE_THRESHOLD: f64 = 0.3;

/// Bitrate clamp, bits/second.
const MIN_BITRATE: f64 = 500_000.0;
const MAX_BITRATE: f64 = 15_000_000.0;

/// Filename keyword tables for first-stage type detection.
const SCREENCAST_KEYWORDS: &[&str] = &[
    "screencast",
    "screen",
    "capture",
    "tutorial",
    "recording",
    "desktop",
    "presentation",
];
const ANIMATION_KEYWORDS: &[&str] = &["anime", "animation", "cartoon", "animated", "3d", "cgi"];
const GAMING_KEYWORDS: &[&str] = &[
    "game",
    "gaming",
    "gameplay",
    "playthrough",
    "walkthrough",
    "let's play",
];
const SPORTS_KEYWORDS: &[&str] = &[
    "sports",
    "football",
    "soccer",
    "basketball",
    "hockey",
    "match",
    "race",
];
const DOCUMENTARY_KEYWORDS: &[&str] = &["documentary", "nature", "wildlife", "science", "history"];

/// Analyzes video content to determine optimal compression settings.
pub struct ContentAnalyzer {
    signal: Arc<dyn SignalProbe>,
}

impl ContentAnalyzer {
    /// Create an analyzer backed by the given signal probe.
    pub fn new(signal: Arc<dyn SignalProbe>) -> Self {
        Self { signal }
    }

    /// Perform full content analysis of a probed video file.
    ///
    /// Signal helper failures are never fatal: scene counting degrades to 0
    /// and frame complexity to a content-type default.
    pub async fn analyze(&self, video_file: &VideoFile) -> VideoAnalysis {
        let content_type = detect_content_type(video_file);
        info!(path = %video_file.path.display(), %content_type, "Detected content type");

        let scene_changes = match self
            .signal
            .scene_change_count(&video_file.path, SCENE_THRESHOLD)
            .await
        {
            Ok(count) => count,
            Err(e) => {
                warn!("Scene detection failed, continuing without: {e}");
                0
            }
        };

        let frame_complexity = match self.signal.frame_complexity(&video_file.path).await {
            Ok(value) => value,
            Err(e) => {
                let fallback = default_frame_complexity(content_type);
                warn!("Frame complexity failed ({e}), using default {fallback}");
                fallback
            }
        };

        let motion_complexity =
            determine_motion_complexity(video_file.duration_seconds, scene_changes, frame_complexity);
        debug!(%motion_complexity, scene_changes, frame_complexity, "Motion classified");

        let spatial_complexity =
            calculate_spatial_complexity(video_file, content_type, frame_complexity);

        let is_hd = video_file.video.height >= 720;
        let is_uhd = video_file.video.height >= 2160 || video_file.video.width >= 3840;

        let recommended_codec = recommend_codec(video_file, content_type).to_string();
        let optimal_bitrate_bps =
            optimal_bitrate(video_file, content_type, motion_complexity, &recommended_codec);
        let compression_potential_percent =
            compression_potential(video_file, content_type, optimal_bitrate_bps);

        info!(
            codec = %recommended_codec,
            bitrate_kbps = optimal_bitrate_bps / 1000,
            potential = compression_potential_percent,
            "Analysis completed"
        );

        VideoAnalysis {
            video_file: video_file.clone(),
            content_type,
            motion_complexity,
            scene_changes,
            frame_complexity,
            spatial_complexity,
            is_hd,
            is_uhd,
            recommended_codec,
            optimal_bitrate_bps,
            compression_potential_percent,
        }
    }

    /// Derive encoder settings from an analysis and a quality level (1..=5).
    pub fn settings(&self, analysis: &VideoAnalysis, quality: u8) -> CompressionSettings {
        derive_settings(analysis, quality)
    }
}

/// Two-stage type detection: filename keywords first, then video properties.
pub(crate) fn detect_content_type(video_file: &VideoFile) -> ContentType {
    let filename = video_file
        .path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let contains_any = |keywords: &[&str]| keywords.iter().any(|k| filename.contains(k));

    if contains_any(SCREENCAST_KEYWORDS) {
        return ContentType::Screencast;
    }
    if contains_any(ANIMATION_KEYWORDS) {
        return ContentType::Animation;
    }
    if contains_any(GAMING_KEYWORDS) {
        return ContentType::Gaming;
    }
    if contains_any(SPORTS_KEYWORDS) {
        return ContentType::SportsAction;
    }
    if contains_any(DOCUMENTARY_KEYWORDS) {
        return ContentType::Documentary;
    }

    let v = &video_file.video;

    // Screencasts sit at common desktop resolutions with steady frame rates
    if v.fps <= 30.0 && matches!(v.width, 1920 | 1280 | 1366 | 1440) {
        return ContentType::Screencast;
    }

    // Animation is typically below 30 fps, SDR, at broadcast widths
    if v.fps < 30.0 && matches!(v.width, 1920 | 1280) && !v.is_hdr {
        return ContentType::Animation;
    }

    // Gaming footage runs at exactly 30 or 60 fps on monitor resolutions
    if (v.fps == 30.0 || v.fps == 60.0) && matches!(v.width, 1920 | 2560 | 3840) {
        return ContentType::Gaming;
    }

    ContentType::LiveAction
}

fn default_frame_complexity(content_type: ContentType) -> f64 {
    match content_type {
        ContentType::Screencast => 100.0,
        ContentType::Animation => 200.0,
        _ => 500.0,
    }
}

/// Classify motion from scene changes per minute and frame complexity.
fn determine_motion_complexity(
    duration_seconds: f64,
    scene_changes: u32,
    frame_complexity: f64,
) -> MotionComplexity {
    let duration_minutes = (duration_seconds / 60.0).max(1.0);
    let scm = scene_changes as f64 / duration_minutes;

    if scm < 2.0 && frame_complexity < 200.0 {
        MotionComplexity::Low
    } else if scm < 5.0 && frame_complexity < 500.0 {
        MotionComplexity::Medium
    } else if scm < 10.0 && frame_complexity < 1000.0 {
        MotionComplexity::High
    } else {
        MotionComplexity::VeryHigh
    }
}

/// Detail level from resolution and measured frame complexity.
///
/// Resolution is weighted more heavily for screencasts, frame complexity
/// more heavily for natural content.
fn calculate_spatial_complexity(
    video_file: &VideoFile,
    content_type: ContentType,
    frame_complexity: f64,
) -> f64 {
    let pixels = (video_file.video.width as f64) * (video_file.video.height as f64);
    let normalized_resolution = if pixels > 0.0 {
        pixels.log10() / (1920.0_f64 * 1080.0).log10()
    } else {
        0.0
    };
    let normalized_complexity = frame_complexity / 500.0;

    match content_type {
        ContentType::Screencast => 0.7 * normalized_resolution + 0.3 * normalized_complexity,
        ContentType::Animation => 0.5 * normalized_resolution + 0.5 * normalized_complexity,
        _ => 0.3 * normalized_resolution + 0.7 * normalized_complexity,
    }
}

/// Recommend a codec family for the content.
fn recommend_codec(video_file: &VideoFile, content_type: ContentType) -> &'static str {
    // HDR requires a codec with proper transfer-function support
    if video_file.video.is_hdr {
        return "hevc";
    }

    let height = video_file.video.height;
    match content_type {
        ContentType::Animation => "vp9",
        ContentType::Screencast => "hevc",
        ContentType::Gaming | ContentType::SportsAction => {
            if height >= 1080 {
                "hevc"
            } else {
                "h264"
            }
        }
        _ => {
            if height >= 1440 {
                "hevc"
            } else {
                "h264"
            }
        }
    }
}

/// Content-aware bitrate target, clamped to [500 kbps, 15 Mbps].
fn optimal_bitrate(
    video_file: &VideoFile,
    content_type: ContentType,
    motion: MotionComplexity,
    codec: &str,
) -> u64 {
    let pixels = (video_file.video.width as f64) * (video_file.video.height as f64);

    // Bits per delivered pixel, by how well the content class compresses
    let bits_per_pixel = match content_type {
        ContentType::Screencast => 0.1,
        ContentType::Animation => 0.15,
        ContentType::Gaming => 0.3,
        ContentType::SportsAction => 0.35,
        _ => 0.25,
    };

    let motion_factor = match motion {
        MotionComplexity::Low => 0.7,
        MotionComplexity::Medium => 1.0,
        MotionComplexity::High => 1.3,
        MotionComplexity::VeryHigh => 1.6,
    };

    let codec_factor = match codec {
        "h264" => 1.0,
        "vp9" => 0.7,
        "hevc" => 0.6,
        "av1" => 0.5,
        _ => 1.0,
    };

    let bitrate = pixels * video_file.video.fps * bits_per_pixel * motion_factor * codec_factor;
    bitrate.clamp(MIN_BITRATE, MAX_BITRATE) as u64
}

/// Estimate how much smaller the file can get, in percent.
fn compression_potential(
    video_file: &VideoFile,
    content_type: ContentType,
    optimal_bitrate: u64,
) -> u8 {
    let source = video_file.overall_bitrate_bps;
    if source == 0 {
        return match content_type {
            ContentType::Screencast => 80,
            ContentType::Animation => 70,
            ContentType::Gaming => 50,
            ContentType::SportsAction => 40,
            _ => 50,
        };
    }

    // Already below the target: the source is well compressed
    if optimal_bitrate > source {
        return 10;
    }

    let potential = ((1.0 - optimal_bitrate as f64 / source as f64) * 100.0).round();
    potential.clamp(0.0, 95.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::path::{Path, PathBuf};
    use vpress_media::{MediaError, MediaResult};
    use vpress_models::{AudioStreamInfo, VideoStreamInfo};

    /// Fixed-measurement probe for deterministic tests.
    struct StubProbe {
        scenes: MediaResult<u32>,
        complexity: MediaResult<f64>,
    }

    impl StubProbe {
        fn fixed(scenes: u32, complexity: f64) -> Arc<Self> {
            Arc::new(Self {
                scenes: Ok(scenes),
                complexity: Ok(complexity),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                scenes: Err(MediaError::ffmpeg_failed("stub", "", None)),
                complexity: Err(MediaError::ffmpeg_failed("stub", "", None)),
            })
        }
    }

    #[async_trait]
    impl SignalProbe for StubProbe {
        async fn scene_change_count(&self, _path: &Path, _threshold: f64) -> MediaResult<u32> {
            match &self.scenes {
                Ok(v) => Ok(*v),
                Err(_) => Err(MediaError::ffmpeg_failed("stub", "", None)),
            }
        }

        async fn frame_complexity(&self, _path: &Path) -> MediaResult<f64> {
            match &self.complexity {
                Ok(v) => Ok(*v),
                Err(_) => Err(MediaError::ffmpeg_failed("stub", "", None)),
            }
        }
    }

    pub(crate) fn video(
        name: &str,
        width: u32,
        height: u32,
        fps: f64,
        duration: f64,
        bitrate: u64,
    ) -> VideoFile {
        VideoFile {
            path: PathBuf::from(format!("/videos/{name}")),
            size_bytes: 100_000_000,
            container_format: "mp4".to_string(),
            duration_seconds: duration,
            overall_bitrate_bps: bitrate,
            video: VideoStreamInfo {
                codec: "h264".to_string(),
                width,
                height,
                fps,
                bitrate_bps: bitrate,
                pixel_format: "yuv420p".to_string(),
                ..Default::default()
            },
            audio_streams: vec![AudioStreamInfo {
                index: 1,
                codec: "aac".to_string(),
                channels: 2,
                sample_rate_hz: 48_000,
                bitrate_bps: 128_000,
                language: String::new(),
            }],
            metadata: BTreeMap::new(),
        }
    }

    #[test]
    fn filename_keywords_win_over_properties() {
        let vf = video("gameplay_walkthrough.mp4", 1280, 720, 25.0, 300.0, 0);
        assert_eq!(detect_content_type(&vf), ContentType::Gaming);

        let vf = video("nature_documentary_s01.mkv", 1920, 1080, 24.0, 3000.0, 0);
        assert_eq!(detect_content_type(&vf), ContentType::Documentary);
    }

    #[test]
    fn property_fallback_classification() {
        // Desktop resolution at <= 30 fps reads as a screencast
        let vf = video("meeting.mp4", 1366, 768, 25.0, 600.0, 0);
        assert_eq!(detect_content_type(&vf), ContentType::Screencast);

        // 60 fps at monitor widths reads as gaming
        let vf = video("clip.mp4", 2560, 1440, 60.0, 600.0, 0);
        assert_eq!(detect_content_type(&vf), ContentType::Gaming);

        // Anything else falls through to live action
        let vf = video("holiday.mov", 3840, 2160, 24.0, 600.0, 0);
        assert_eq!(detect_content_type(&vf), ContentType::LiveAction);
    }

    #[tokio::test]
    async fn analysis_is_deterministic() {
        let vf = video("tutorial_1080p.mp4", 1920, 1080, 30.0, 120.0, 5_000_000);
        let analyzer = ContentAnalyzer::new(StubProbe::fixed(4, 150.0));
        let first = analyzer.analyze(&vf).await;
        let second = analyzer.analyze(&vf).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn helper_failures_fall_back_to_defaults() {
        let vf = video("tutorial.mp4", 1920, 1080, 30.0, 120.0, 5_000_000);
        let analyzer = ContentAnalyzer::new(StubProbe::failing());
        let analysis = analyzer.analyze(&vf).await;
        assert_eq!(analysis.scene_changes, 0);
        assert_eq!(analysis.frame_complexity, 100.0, "screencast default");
    }

    #[tokio::test]
    async fn scenario_screencast_1080p() {
        // 120 s 1080p30 screencast at 5 Mbps h264
        let vf = video("tutorial_1080p_30fps.mp4", 1920, 1080, 30.0, 120.0, 5_000_000);
        // scm = 4/2 = 2.0 with fc = 250 -> Medium motion, factor 1.0
        let analyzer = ContentAnalyzer::new(StubProbe::fixed(4, 250.0));
        let analysis = analyzer.analyze(&vf).await;

        assert_eq!(analysis.content_type, ContentType::Screencast);
        assert_eq!(analysis.motion_complexity, MotionComplexity::Medium);
        assert_eq!(analysis.recommended_codec, "hevc");
        let expected = 1920.0 * 1080.0 * 30.0 * 0.1 * 1.0 * 0.6;
        assert_eq!(analysis.optimal_bitrate_bps, expected as u64);
        // Roughly 3.73 Mbps, inside the clamp band and so unchanged by it
        assert!((3_700_000..=3_800_000).contains(&analysis.optimal_bitrate_bps));
        assert!(analysis.is_hd);
        assert!(!analysis.is_uhd);
    }

    #[tokio::test]
    async fn scenario_hdr_sports_4k() {
        let mut vf = video("soccer_match_4k_60fps.mp4", 3840, 2160, 60.0, 600.0, 40_000_000);
        vf.video.is_hdr = true;
        let analyzer = ContentAnalyzer::new(StubProbe::fixed(120, 900.0));
        let analysis = analyzer.analyze(&vf).await;

        assert_eq!(analysis.content_type, ContentType::SportsAction);
        assert_eq!(analysis.recommended_codec, "hevc", "HDR forces hevc");
        assert!(analysis.is_uhd);
        // 4K60 at 0.35 bits/pixel is far above the cap
        assert_eq!(analysis.optimal_bitrate_bps, 15_000_000);
    }

    #[tokio::test]
    async fn scenario_animation_vp9() {
        let vf = video("anime_ep.mkv", 1920, 1080, 24.0, 1440.0, 6_000_000);
        let analyzer = ContentAnalyzer::new(StubProbe::fixed(48, 250.0));
        let analysis = analyzer.analyze(&vf).await;

        assert_eq!(analysis.content_type, ContentType::Animation);
        assert_eq!(analysis.recommended_codec, "vp9");
        // scm = 48/24 = 2, fc = 250 -> Medium motion
        let expected = 1920.0 * 1080.0 * 24.0 * 0.15 * 1.0 * 0.7;
        assert_eq!(analysis.optimal_bitrate_bps, expected as u64);
    }

    #[tokio::test]
    async fn bitrate_always_within_bounds() {
        let analyzer = ContentAnalyzer::new(StubProbe::fixed(10, 600.0));
        let cases = [
            video("tiny.mp4", 320, 240, 15.0, 30.0, 200_000),
            video("hd.mp4", 1280, 720, 30.0, 300.0, 3_000_000),
            video("uhd60.mp4", 3840, 2160, 60.0, 600.0, 80_000_000),
            video("odd.mp4", 7680, 4320, 120.0, 10.0, 0),
        ];
        for vf in cases {
            let analysis = analyzer.analyze(&vf).await;
            assert!(
                (500_000..=15_000_000).contains(&analysis.optimal_bitrate_bps),
                "bitrate {} out of bounds for {:?}",
                analysis.optimal_bitrate_bps,
                vf.path
            );
        }
    }

    #[tokio::test]
    async fn well_compressed_sources_report_small_potential() {
        // Source bitrate below the optimal target
        let vf = video("holiday.mov", 1280, 720, 24.0, 90.0, 600_000);
        let analyzer = ContentAnalyzer::new(StubProbe::fixed(20, 800.0));
        let analysis = analyzer.analyze(&vf).await;
        assert_eq!(analysis.compression_potential_percent, 10);
    }

    #[tokio::test]
    async fn unknown_bitrate_uses_static_estimates() {
        let vf = video("tutorial_screen.mp4", 1920, 1080, 30.0, 120.0, 0);
        let analyzer = ContentAnalyzer::new(StubProbe::fixed(0, 100.0));
        let analysis = analyzer.analyze(&vf).await;
        assert_eq!(analysis.compression_potential_percent, 80);
    }

    #[test]
    fn motion_classification_table() {
        assert_eq!(
            determine_motion_complexity(600.0, 5, 100.0),
            MotionComplexity::Low
        );
        assert_eq!(
            determine_motion_complexity(600.0, 30, 400.0),
            MotionComplexity::Medium
        );
        assert_eq!(
            determine_motion_complexity(600.0, 90, 900.0),
            MotionComplexity::High
        );
        assert_eq!(
            determine_motion_complexity(600.0, 200, 2000.0),
            MotionComplexity::VeryHigh
        );
    }

    #[test]
    fn short_videos_clamp_duration_to_one_minute() {
        // 30 s with 9 cuts: divisor clamps to 1 minute -> scm 9, fc low -> High
        assert_eq!(
            determine_motion_complexity(30.0, 9, 600.0),
            MotionComplexity::High
        );
    }
}
