//! Compression orchestration.

use std::path::Path;
use std::time::Instant;

use tempfile::TempDir;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use vpress_analyzer::derive_settings;
use vpress_media::{
    merge_segments, probe_file, split_segments, write_concat_list, FfmpegCommand, FfmpegRunner,
    FfmpegTools,
};
use vpress_models::{CompressionResult, CompressionSettings, ContentType, SpeedPreset, VideoAnalysis};

use crate::aggregator::ProgressAggregator;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::preset::apply_speed_preset;
use crate::quality::estimate_frame_quality;

/// Minimum duration before the split/concat overhead pays off.
const PARALLEL_MIN_DURATION: f64 = 60.0;

/// Keyframe expression forcing an IDR at the start of each segment, so the
/// stream-copy merge produces a decodable result.
const SEGMENT_KEYFRAME_EXPR: &str = "expr:eq(n,0)";

/// Whether a video takes the segmented parallel path.
///
/// Short videos do not amortize the split overhead, and screencasts encode so
/// fast that single-pass wins outright.
pub fn uses_parallel_strategy(analysis: &VideoAnalysis) -> bool {
    analysis.video_file.duration_seconds > PARALLEL_MIN_DURATION
        && analysis.content_type != ContentType::Screencast
}

/// Drives FFmpeg to re-encode a video, single-pass or segmented-parallel.
///
/// The compressor owns no state between calls; every result is
/// self-contained.
pub struct Compressor {
    tools: FfmpegTools,
    config: EngineConfig,
}

impl Compressor {
    /// Create a compressor.
    pub fn new(tools: FfmpegTools, config: EngineConfig) -> Self {
        Self { tools, config }
    }

    /// Compress `input` into `output` according to the analysis.
    ///
    /// When `settings` is `None` they are derived from the analysis and
    /// `quality`. Progress is reported to `sink` as integer percents,
    /// monotonically non-decreasing and ending at exactly 100.
    #[allow(clippy::too_many_arguments)]
    pub async fn compress<F>(
        &self,
        input: &Path,
        output: &Path,
        analysis: &VideoAnalysis,
        settings: Option<CompressionSettings>,
        quality: u8,
        speed_preset: SpeedPreset,
        mut sink: F,
    ) -> EngineResult<CompressionResult>
    where
        F: FnMut(u32) + Send,
    {
        let start = Instant::now();
        let original_size = tokio::fs::metadata(input).await?.len();

        let mut settings = settings.unwrap_or_else(|| derive_settings(analysis, quality));
        apply_speed_preset(&mut settings, speed_preset, self.config.max_workers);

        if uses_parallel_strategy(analysis) {
            info!(
                workers = self.config.max_workers,
                input = %input.display(),
                "Using segmented parallel compression"
            );
            self.compress_parallel(input, output, analysis, &settings, &mut sink)
                .await?;
        } else {
            debug!(input = %input.display(), "Using single-pass compression");
            self.compress_single(input, output, analysis, &settings, &mut sink)
                .await?;
        }

        let compressed_size = tokio::fs::metadata(output).await?.len();

        let mut result = CompressionResult {
            input_path: input.to_path_buf(),
            output_path: output.to_path_buf(),
            original_size_bytes: original_size,
            compressed_size_bytes: compressed_size,
            compression_ratio: 0.0,
            saved_bytes: 0,
            saved_percent: 0.0,
            processing_duration: start.elapsed(),
            average_frame_quality: estimate_frame_quality(&settings),
            settings_used: settings,
            error: None,
        };
        result.finalize_sizes();

        info!(
            input = %input.display(),
            saved_percent = format!("{:.1}", result.saved_percent),
            ratio = format!("{:.2}", result.compression_ratio),
            "Compression finished"
        );
        Ok(result)
    }

    /// One FFmpeg pass over the whole file, progress forwarded unchanged.
    async fn compress_single<F>(
        &self,
        input: &Path,
        output: &Path,
        analysis: &VideoAnalysis,
        settings: &CompressionSettings,
        sink: &mut F,
    ) -> EngineResult<()>
    where
        F: FnMut(u32) + Send,
    {
        let cmd = FfmpegCommand::new(input, output, settings.clone());
        let runner = FfmpegRunner::new(self.tools.clone());
        runner
            .run_with_progress(&cmd, analysis.video_file.duration_seconds, |pct| sink(pct))
            .await?;
        Ok(())
    }

    /// Split into N segments, encode them concurrently, stream-copy merge.
    async fn compress_parallel<F>(
        &self,
        input: &Path,
        output: &Path,
        analysis: &VideoAnalysis,
        settings: &CompressionSettings,
        sink: &mut F,
    ) -> EngineResult<()>
    where
        F: FnMut(u32) + Send,
    {
        let workers = self.config.max_workers.max(1);

        tokio::fs::create_dir_all(&self.config.work_dir).await?;
        // Removed on every exit path, including errors below
        let segment_dir = TempDir::with_prefix_in("segments_", &self.config.work_dir)?;

        let segment_duration = analysis.video_file.duration_seconds / workers as f64;
        let segments = split_segments(
            &self.tools,
            input,
            segment_dir.path(),
            segment_duration,
            workers,
        )
        .await?;

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (progress_tx, mut progress_rx) = mpsc::unbounded_channel::<(usize, u32)>();

        let mut join_set: JoinSet<Result<(), (usize, vpress_media::MediaError)>> = JoinSet::new();
        let mut encoded: Vec<_> = Vec::with_capacity(workers);

        for (i, segment) in segments.iter().enumerate() {
            let out_path = segment_dir.path().join(format!("out_{i:04}.mp4"));
            encoded.push(out_path.clone());

            let tools = self.tools.clone();
            let segment = segment.clone();
            let tx = progress_tx.clone();
            let cancel = cancel_rx.clone();
            let mut segment_settings = settings.clone();
            segment_settings.force_key_frames = Some(SEGMENT_KEYFRAME_EXPR.to_string());

            join_set.spawn(async move {
                // Stream-copied segments land on keyframes, so the actual
                // duration can differ from the requested slice
                let duration = match probe_file(&tools, &segment).await {
                    Ok(info) => info.duration_seconds,
                    Err(e) => {
                        warn!(segment = i, "Segment probe failed ({e}), using nominal duration");
                        segment_duration
                    }
                };

                let cmd = FfmpegCommand::new(&segment, &out_path, segment_settings);
                let runner = FfmpegRunner::new(tools).with_cancel(cancel);
                runner
                    .run_with_progress(&cmd, duration, move |pct| {
                        let _ = tx.send((i, pct));
                    })
                    .await
                    .map_err(|e| (i, e))
            });
        }
        drop(progress_tx);

        // Single aggregator: sole writer of the outer progress
        let mut aggregator = ProgressAggregator::new(workers);
        let mut first_error: Option<EngineError> = None;
        let mut remaining = workers;

        while remaining > 0 {
            tokio::select! {
                Some(update) = progress_rx.recv() => {
                    if let Some(outer) = aggregator.update(update.0, update.1) {
                        sink(outer);
                    }
                }
                joined = join_set.join_next() => {
                    match joined {
                        Some(Ok(Ok(()))) => {}
                        Some(Ok(Err((index, source)))) => {
                            if first_error.is_none() {
                                warn!(segment = index, "Worker failed, cancelling remaining workers");
                                let _ = cancel_tx.send(true);
                                first_error = Some(EngineError::Segment { index, source });
                            }
                        }
                        Some(Err(join_err)) => {
                            if first_error.is_none() {
                                let _ = cancel_tx.send(true);
                                first_error = Some(EngineError::WorkerPanic(join_err.to_string()));
                            }
                        }
                        None => break,
                    }
                    remaining = remaining.saturating_sub(1);
                }
            }
        }

        // Drain updates that raced with worker completion
        while let Ok(update) = progress_rx.try_recv() {
            if let Some(outer) = aggregator.update(update.0, update.1) {
                sink(outer);
            }
        }

        if let Some(error) = first_error {
            return Err(error);
        }

        let list = write_concat_list(segment_dir.path(), &encoded).await?;
        merge_segments(&self.tools, &list, output)
            .await
            .map_err(EngineError::Merge)?;

        sink(aggregator.complete());
        Ok(())
    }
}
