//! Encoder settings derivation.

use vpress_models::{CompressionSettings, ContentType, VideoAnalysis};

/// Per-encoder CRF baselines and clamps.
struct CrfRange {
    base: i32,
    min: u8,
    max: u8,
}

fn crf_range(encoder: &str) -> CrfRange {
    match encoder {
        "libx265" => CrfRange {
            base: 25,
            min: 20,
            max: 32,
        },
        "libvpx-vp9" => CrfRange {
            base: 31,
            min: 15,
            max: 35,
        },
        _ => CrfRange {
            base: 23,
            min: 18,
            max: 28,
        },
    }
}

/// Encoder id for a recommended codec family.
fn encoder_for(codec: &str) -> &'static str {
    match codec {
        "hevc" => "libx265",
        "vp9" => "libvpx-vp9",
        _ => "libx264",
    }
}

/// Preset by quality level 1..=5; slower presets buy compression.
fn preset_for(quality: u8) -> &'static str {
    match quality {
        1 => "slower",
        2 => "slow",
        4 => "fast",
        5 => "veryfast",
        _ => "medium",
    }
}

/// Derive concrete encoder settings from an analysis and quality level.
///
/// Quality 1 maximizes compression, 5 maximizes fidelity. Out-of-range values
/// are treated as the balanced default (3).
pub fn derive_settings(analysis: &VideoAnalysis, quality: u8) -> CompressionSettings {
    let quality = if (1..=5).contains(&quality) { quality } else { 3 };

    let encoder = encoder_for(&analysis.recommended_codec);
    let range = crf_range(encoder);

    let quality_offset = (3 - quality as i32) * 2;
    let content_delta = match analysis.content_type {
        ContentType::Screencast => 3,
        ContentType::Animation => 1,
        ContentType::Gaming => -1,
        ContentType::SportsAction => -2,
        _ => 0,
    };
    let crf = (range.base + quality_offset + content_delta)
        .clamp(range.min as i32, range.max as i32) as u8;

    let mut settings = CompressionSettings {
        codec: Some(encoder.to_string()),
        preset: Some(preset_for(quality).to_string()),
        crf: Some(crf),
        tune: Some(tune_for(analysis.content_type).to_string()),
        pix_fmt: Some(if analysis.video_file.video.is_hdr {
            "yuv420p10le".to_string()
        } else {
            "yuv420p".to_string()
        }),
        ..Default::default()
    };

    match encoder {
        "libx264" => {
            let high_profile = matches!(
                analysis.content_type,
                ContentType::Gaming | ContentType::LiveAction
            );
            settings.profile = Some(if high_profile { "high" } else { "main" }.to_string());
            settings.level = Some(if high_profile { "4.1" } else { "3.1" }.to_string());
        }
        "libx265" => {
            settings.profile = Some(if analysis.video_file.video.is_hdr {
                "main10".to_string()
            } else {
                "main".to_string()
            });
            if analysis.content_type == ContentType::Screencast {
                settings.x265_params = Some("bframes=0".to_string());
            }
        }
        "libvpx-vp9" => {
            // VP9 rate control wants an explicit ceiling alongside CRF
            let scale = match quality {
                1 => 0.7,
                5 => 1.3,
                _ => 1.0,
            };
            let kbps = (analysis.optimal_bitrate_bps as f64 * scale / 1000.0) as u64;
            settings.bitrate = Some(format!("{kbps}k"));
        }
        _ => {}
    }

    apply_audio_policy(&mut settings, analysis);
    settings
}

fn tune_for(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Animation => "animation",
        ContentType::Screencast => "zerolatency",
        ContentType::Documentary => "grain",
        ContentType::Unknown => "stillimage",
        _ => "film",
    }
}

/// Copy compatible audio; re-encode anything else to AAC.
fn apply_audio_policy(settings: &mut CompressionSettings, analysis: &VideoAnalysis) {
    let Some(audio) = analysis.video_file.primary_audio() else {
        return;
    };

    if matches!(audio.codec.as_str(), "aac" | "opus") {
        settings.audio_codec = Some("copy".to_string());
        return;
    }

    settings.audio_codec = Some("aac".to_string());
    let wants_high_bitrate = matches!(
        analysis.content_type,
        ContentType::LiveAction | ContentType::Documentary
    ) && audio.bitrate_bps > 192_000;
    settings.audio_bitrate = Some(if wants_high_bitrate { "192k" } else { "128k" }.to_string());
}
