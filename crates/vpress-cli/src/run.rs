//! Compression run wiring: single file and directory modes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use vpress_analyzer::ContentAnalyzer;
use vpress_cache::AnalysisCache;
use vpress_engine::{Compressor, EngineConfig};
use vpress_media::{probe_file, FfmpegSignalProbe, FfmpegTools};
use vpress_models::{Report, VideoAnalysis, VideoFile};
use vpress_report::{assemble_report, save_report};

use crate::args::Cli;
use crate::paths::{collect_video_files, default_output_path};

/// Everything a compression run needs, wired once at startup.
struct App {
    tools: FfmpegTools,
    analyzer: ContentAnalyzer,
    compressor: Compressor,
    cache: Option<AnalysisCache>,
}

pub async fn run(cli: &Cli) -> anyhow::Result<()> {
    let input = cli
        .input
        .as_ref()
        .context("missing required input; pass -i/--input")?;
    anyhow::ensure!(
        input.exists(),
        "input does not exist: {}",
        input.display()
    );

    let tools = FfmpegTools::discover()
        .context("FFmpeg tools not found; install ffmpeg and ffprobe")?;
    let analyzer = ContentAnalyzer::new(Arc::new(FfmpegSignalProbe::new(tools.clone())));
    let compressor = Compressor::new(tools.clone(), EngineConfig::from_env());

    let cache = if cli.use_cache {
        match AnalysisCache::open_default(cli.cache_max_age * 24) {
            Ok(cache) => {
                if cli.clear_cache {
                    match cache.clean_expired() {
                        Ok(removed) if removed > 0 => {
                            info!("Cleaned {removed} expired cache entries")
                        }
                        Ok(_) => {}
                        Err(e) => warn!("Failed to clean expired cache entries: {e}"),
                    }
                }
                match cache.stats() {
                    Ok((total, valid)) => {
                        info!("Cache status: {total} total entries, {valid} valid")
                    }
                    Err(e) => warn!("Failed to read cache statistics: {e}"),
                }
                Some(cache)
            }
            Err(e) => {
                warn!("Failed to initialize cache, continuing without: {e}");
                None
            }
        }
    } else {
        None
    };

    let app = App {
        tools,
        analyzer,
        compressor,
        cache,
    };

    if input.is_dir() {
        process_directory(&app, cli, input).await
    } else {
        let output = cli
            .output
            .clone()
            .unwrap_or_else(|| default_output_path(input, None));
        process_file(&app, cli, input, &output).await
    }
}

/// Process every video in a directory, continuing past per-file failures.
async fn process_directory(app: &App, cli: &Cli, input_dir: &Path) -> anyhow::Result<()> {
    let output_dir = cli.output.clone().unwrap_or_else(|| {
        let mut dir = input_dir.as_os_str().to_owned();
        dir.push("_compressed");
        PathBuf::from(dir)
    });
    std::fs::create_dir_all(&output_dir).with_context(|| {
        format!("failed to create output directory {}", output_dir.display())
    })?;

    let files = collect_video_files(input_dir, cli.recursive)
        .with_context(|| format!("failed to read directory {}", input_dir.display()))?;
    if files.is_empty() {
        warn!("No video files found in {}", input_dir.display());
        return Ok(());
    }

    println!(
        "{} {} ({} files)",
        style("Processing directory").bold(),
        input_dir.display(),
        files.len()
    );

    let mut failures = 0usize;
    for file in &files {
        let output = default_output_path(file, Some(&output_dir));
        if let Err(e) = process_file(app, cli, file, &output).await {
            warn!("Failed to process {}: {e:#}", file.display());
            failures += 1;
        }
    }

    let processed = files.len() - failures;
    println!(
        "{} {processed}/{} files compressed",
        style("Done:").green().bold(),
        files.len()
    );
    anyhow::ensure!(failures == 0, "{failures} file(s) failed");
    Ok(())
}

/// Compress one file end to end: probe, analyze (cache-aware), encode,
/// report.
async fn process_file(app: &App, cli: &Cli, input: &Path, output: &Path) -> anyhow::Result<()> {
    anyhow::ensure!(
        cli.force || !output.exists(),
        "output file already exists (use -f to force overwrite): {}",
        output.display()
    );

    println!();
    println!("{} {}", style("Compressing").bold(), input.display());

    let mut cache_hit = false;
    let (video_file, analysis) = match app.cache.as_ref().and_then(|c| c.get(input)) {
        Some((analysis, video_file)) => {
            info!("Using cached analysis for {}", input.display());
            cache_hit = true;
            (video_file, analysis)
        }
        None => {
            let video_file = probe_file(&app.tools, input)
                .await
                .with_context(|| format!("failed to probe {}", input.display()))?;
            if let Some(cache) = &app.cache {
                if let Ok(similar) = cache.find_similar(
                    &video_file.resolution(),
                    video_file.duration_seconds,
                    &video_file.video.codec,
                    0.1,
                ) {
                    if !similar.is_empty() {
                        debug!(
                            count = similar.len(),
                            "Found previously analyzed videos with similar characteristics"
                        );
                    }
                }
            }
            let analysis = app.analyzer.analyze(&video_file).await;
            if let Some(cache) = &app.cache {
                if let Err(e) = cache.put(input, &analysis, &video_file) {
                    warn!("Failed to cache analysis: {e}");
                }
            }
            (video_file, analysis)
        }
    };

    print_summary(&video_file, &analysis, cache_hit);

    let settings = app.analyzer.settings(&analysis, cli.quality);

    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>3}% {msg}")
            .expect("static progress template"),
    );
    bar.set_message("compressing");
    let sink_bar = bar.clone();

    let started_at = Utc::now();
    let result = app
        .compressor
        .compress(
            input,
            output,
            &analysis,
            Some(settings),
            cli.quality,
            cli.preset,
            move |pct| sink_bar.set_position(pct as u64),
        )
        .await
        .with_context(|| format!("compression of {} failed", input.display()))?;
    bar.finish_with_message("done");

    let report = assemble_report(video_file, analysis, result, started_at);
    print_result(&report);

    match save_report(&report).await {
        Ok(path) => info!("Compression report saved to {}", path.display()),
        Err(e) => warn!("Failed to save report: {e}"),
    }

    Ok(())
}

fn print_summary(video_file: &VideoFile, analysis: &VideoAnalysis, cache_hit: bool) {
    println!(
        "  {} {}  {} {:.1} fps  {} {:.1}s{}",
        style("resolution").dim(),
        video_file.resolution(),
        style("rate").dim(),
        video_file.video.fps,
        style("duration").dim(),
        video_file.duration_seconds,
        if cache_hit { "  (cached analysis)" } else { "" }
    );
    println!(
        "  {} {}  {} {} motion  {} {}  {} {}%",
        style("content").dim(),
        analysis.content_type,
        style("complexity").dim(),
        analysis.motion_complexity,
        style("codec").dim(),
        analysis.recommended_codec,
        style("potential").dim(),
        analysis.compression_potential_percent
    );
}

fn print_result(report: &Report) {
    let result = &report.result;
    let mb = 1024.0 * 1024.0;
    println!(
        "  {} {:.2} MB -> {:.2} MB ({:.1}% saved, ratio {:.2}:1)",
        style("result").green().bold(),
        result.original_size_bytes as f64 / mb,
        result.compressed_size_bytes as f64 / mb,
        result.saved_percent,
        result.compression_ratio
    );
    println!(
        "  {} {}  {} {:.1}/100",
        style("quality").dim(),
        report.quality_estimate,
        style("score").dim(),
        report.performance_score
    );
    for tip in &report.tips {
        println!("  {} {tip}", style("tip").yellow());
    }
}
