//! Speed preset adjustment.

use vpress_models::{CompressionSettings, SpeedPreset};

/// CRF floor when `thorough` sharpens quality.
const THOROUGH_CRF_FLOOR: u8 = 18;

/// Rewrite the analyzer's settings for the chosen speed preset.
///
/// `balanced` is the identity. `fast` shifts the encoder preset toward the
/// fast end and pins the thread count. `thorough` shifts toward the slow end
/// and buys two points of CRF, floored at 18.
pub fn apply_speed_preset(
    settings: &mut CompressionSettings,
    preset: SpeedPreset,
    worker_count: usize,
) {
    match preset {
        SpeedPreset::Balanced => {}
        SpeedPreset::Fast => {
            let current = settings.preset.as_deref().unwrap_or("medium");
            let faster = match current {
                "veryslow" => "medium",
                "slower" | "slow" => "fast",
                "medium" => "veryfast",
                _ => "ultrafast",
            };
            settings.preset = Some(faster.to_string());
            settings.threads = Some(worker_count as u32);
        }
        SpeedPreset::Thorough => {
            let current = settings.preset.as_deref().unwrap_or("medium");
            let slower = match current {
                "ultrafast" | "veryfast" => "medium",
                "fast" | "medium" => "slow",
                _ => "veryslow",
            };
            settings.preset = Some(slower.to_string());
            if let Some(crf) = settings.crf {
                settings.crf = Some(crf.saturating_sub(2).max(THOROUGH_CRF_FLOOR));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_preset(preset: &str, crf: u8) -> CompressionSettings {
        CompressionSettings {
            preset: Some(preset.to_string()),
            crf: Some(crf),
            ..Default::default()
        }
    }

    #[test]
    fn balanced_is_identity() {
        let mut settings = with_preset("medium", 23);
        let before = settings.clone();
        apply_speed_preset(&mut settings, SpeedPreset::Balanced, 4);
        assert_eq!(settings, before);
    }

    #[test]
    fn fast_shifts_toward_speed_and_pins_threads() {
        let mut settings = with_preset("slow", 23);
        apply_speed_preset(&mut settings, SpeedPreset::Fast, 6);
        assert_eq!(settings.preset.as_deref(), Some("fast"));
        assert_eq!(settings.threads, Some(6));

        let mut settings = with_preset("medium", 23);
        apply_speed_preset(&mut settings, SpeedPreset::Fast, 6);
        assert_eq!(settings.preset.as_deref(), Some("veryfast"));
    }

    #[test]
    fn thorough_shifts_toward_quality() {
        // A quality-1 baseline ("slower") lands on veryslow with CRF -2
        let mut settings = with_preset("slower", 32);
        apply_speed_preset(&mut settings, SpeedPreset::Thorough, 4);
        assert_eq!(settings.preset.as_deref(), Some("veryslow"));
        assert_eq!(settings.crf, Some(30));
    }

    #[test]
    fn thorough_crf_floor_holds() {
        let mut settings = with_preset("medium", 19);
        apply_speed_preset(&mut settings, SpeedPreset::Thorough, 4);
        assert_eq!(settings.crf, Some(18));

        let mut settings = with_preset("medium", 18);
        apply_speed_preset(&mut settings, SpeedPreset::Thorough, 4);
        assert_eq!(settings.crf, Some(18));
    }
}
