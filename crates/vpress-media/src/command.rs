//! FFmpeg command building and execution.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::sync::watch;
use tracing::{debug, info};

use vpress_models::CompressionSettings;

use crate::error::{MediaError, MediaResult};
use crate::progress::ProgressScanner;
use crate::tools::FfmpegTools;

/// One FFmpeg encode invocation: input, output and the typed settings that
/// become the argv at the process boundary.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    input: PathBuf,
    output: PathBuf,
    settings: CompressionSettings,
}

impl FfmpegCommand {
    /// Create an encode command.
    pub fn new(
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        settings: CompressionSettings,
    ) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            settings,
        }
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn settings(&self) -> &CompressionSettings {
        &self.settings
    }

    /// Build the argv.
    ///
    /// Input flags go before `-i`, output flags after; option order matches
    /// what FFmpeg accepts for every supported encoder. Absent options are
    /// omitted entirely.
    pub fn build_args(&self) -> Vec<String> {
        let s = &self.settings;
        let mut args: Vec<String> = vec![
            "-y".into(),
            "-i".into(),
            self.input.to_string_lossy().into_owned(),
        ];

        if let Some(codec) = &s.codec {
            args.push("-c:v".into());
            args.push(codec.clone());
        }
        if let Some(preset) = &s.preset {
            args.push("-preset".into());
            args.push(preset.clone());
        }
        if let Some(crf) = s.crf {
            args.push("-crf".into());
            args.push(crf.to_string());
        }
        if let Some(profile) = &s.profile {
            args.push("-profile:v".into());
            args.push(profile.clone());
        }
        if let Some(level) = &s.level {
            args.push("-level".into());
            args.push(level.clone());
        }
        if let Some(tune) = &s.tune {
            args.push("-tune".into());
            args.push(tune.clone());
        }
        if s.is_x265() {
            if let Some(params) = &s.x265_params {
                args.push("-x265-params".into());
                args.push(params.clone());
            }
        }
        if let Some(pix_fmt) = &s.pix_fmt {
            args.push("-pix_fmt".into());
            args.push(pix_fmt.clone());
        }
        if let Some(expr) = &s.force_key_frames {
            args.push("-force_key_frames".into());
            args.push(expr.clone());
        }
        match s.audio_codec.as_deref() {
            Some("copy") => {
                args.push("-c:a".into());
                args.push("copy".into());
            }
            Some(codec) => {
                args.push("-c:a".into());
                args.push(codec.to_string());
                if let Some(bitrate) = &s.audio_bitrate {
                    args.push("-b:a".into());
                    args.push(bitrate.clone());
                }
            }
            None => {}
        }
        if let Some(threads) = s.threads {
            args.push("-threads".into());
            args.push(threads.to_string());
        }
        if let Some(bitrate) = &s.bitrate {
            args.push("-b:v".into());
            args.push(bitrate.clone());
        }

        args.push(self.output.to_string_lossy().into_owned());
        args
    }
}

/// Runner for FFmpeg commands with progress tracking and cancellation.
pub struct FfmpegRunner {
    tools: FfmpegTools,
    cancel_rx: Option<watch::Receiver<bool>>,
}

impl FfmpegRunner {
    /// Create a runner.
    pub fn new(tools: FfmpegTools) -> Self {
        Self {
            tools,
            cancel_rx: None,
        }
    }

    /// Attach a cancellation signal; when it flips to true the child process
    /// is killed and the run returns [`MediaError::Cancelled`].
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    /// Run an encode, reporting integer percent updates of `duration_seconds`.
    ///
    /// The full error stream is retained; on non-zero exit it is attached to
    /// the returned error so callers can diagnose codec-specific failures.
    pub async fn run_with_progress<F>(
        &self,
        cmd: &FfmpegCommand,
        duration_seconds: f64,
        mut progress_sink: F,
    ) -> MediaResult<()>
    where
        F: FnMut(u32) + Send,
    {
        let args = cmd.build_args();
        debug!("Running FFmpeg: {} {}", self.tools.ffmpeg().display(), args.join(" "));

        let mut child = Command::new(self.tools.ffmpeg())
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| MediaError::ffmpeg_failed("stderr not captured", "", None))?;

        let mut scanner = ProgressScanner::new(duration_seconds);
        let mut stderr_buf = String::new();
        let mut read_buf = [0u8; 2048];
        let mut cancel_rx = self.cancel_rx.clone();

        loop {
            let read = async { stderr.read(&mut read_buf).await };
            let n = if let Some(rx) = cancel_rx.as_mut() {
                tokio::select! {
                    n = read => n?,
                    _ = rx.changed() => {
                        if *rx.borrow() {
                            info!("FFmpeg cancelled, killing process");
                            let _ = child.kill().await;
                            return Err(MediaError::Cancelled);
                        }
                        continue;
                    }
                }
            } else {
                read.await?
            };

            if n == 0 {
                break;
            }

            let chunk = String::from_utf8_lossy(&read_buf[..n]);
            stderr_buf.push_str(&chunk);
            for percent in scanner.push(&chunk) {
                progress_sink(percent);
            }
        }

        let status = child.wait().await?;

        if let Some(rx) = &self.cancel_rx {
            if *rx.borrow() {
                return Err(MediaError::Cancelled);
            }
        }

        if !status.success() {
            return Err(MediaError::ffmpeg_failed(
                format!("encode of {} failed", cmd.input().display()),
                stderr_buf,
                status.code(),
            ));
        }

        if let Some(percent) = scanner.finish() {
            progress_sink(percent);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> CompressionSettings {
        CompressionSettings {
            codec: Some("libx265".to_string()),
            preset: Some("medium".to_string()),
            crf: Some(28),
            profile: Some("main".to_string()),
            tune: Some("zerolatency".to_string()),
            x265_params: Some("bframes=0".to_string()),
            pix_fmt: Some("yuv420p".to_string()),
            audio_codec: Some("copy".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn argv_order_is_stable() {
        let cmd = FfmpegCommand::new("in.mp4", "out.mp4", settings());
        let args = cmd.build_args();
        assert_eq!(
            args,
            vec![
                "-y", "-i", "in.mp4", "-c:v", "libx265", "-preset", "medium", "-crf", "28",
                "-profile:v", "main", "-tune", "zerolatency", "-x265-params", "bframes=0",
                "-pix_fmt", "yuv420p", "-c:a", "copy", "out.mp4",
            ]
        );
    }

    #[test]
    fn audio_reencode_carries_bitrate() {
        let cmd = FfmpegCommand::new(
            "in.mp4",
            "out.mp4",
            CompressionSettings {
                audio_codec: Some("aac".to_string()),
                audio_bitrate: Some("128k".to_string()),
                ..Default::default()
            },
        );
        let args = cmd.build_args();
        let pos = args.iter().position(|a| a == "-c:a").unwrap();
        assert_eq!(&args[pos..pos + 4], &["-c:a", "aac", "-b:a", "128k"]);
    }

    #[test]
    fn x265_params_skipped_for_other_encoders() {
        let cmd = FfmpegCommand::new(
            "in.mp4",
            "out.mp4",
            CompressionSettings {
                codec: Some("libx264".to_string()),
                x265_params: Some("bframes=0".to_string()),
                ..Default::default()
            },
        );
        assert!(!cmd.build_args().contains(&"-x265-params".to_string()));
    }

    #[test]
    fn absent_options_are_omitted() {
        let cmd = FfmpegCommand::new("a.mp4", "b.mp4", CompressionSettings::default());
        assert_eq!(cmd.build_args(), vec!["-y", "-i", "a.mp4", "b.mp4"]);
    }

    #[test]
    fn bitrate_and_threads_trail_the_codec_options() {
        let cmd = FfmpegCommand::new(
            "in.mp4",
            "out.webm",
            CompressionSettings {
                codec: Some("libvpx-vp9".to_string()),
                crf: Some(31),
                bitrate: Some("2000k".to_string()),
                threads: Some(4),
                ..Default::default()
            },
        );
        let args = cmd.build_args();
        let threads = args.iter().position(|a| a == "-threads").unwrap();
        let bitrate = args.iter().position(|a| a == "-b:v").unwrap();
        assert!(threads < bitrate);
        assert_eq!(args.last().unwrap(), "out.webm");
    }
}
