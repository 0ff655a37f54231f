//! Runner tests backed by stub executables standing in for ffmpeg.
#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use vpress_media::{FfmpegCommand, FfmpegRunner, FfmpegTools, MediaError};
use vpress_models::CompressionSettings;

fn write_stub(dir: &Path, name: &str, script: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, script).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

fn tools_with_ffmpeg(dir: &Path, script: &str) -> FfmpegTools {
    let ffmpeg = write_stub(dir, "ffmpeg", script);
    FfmpegTools::from_paths(ffmpeg, dir.join("ffprobe"))
}

#[tokio::test]
async fn progress_is_monotonic_and_ends_at_one_hundred() {
    let dir = TempDir::new().unwrap();
    let tools = tools_with_ffmpeg(
        dir.path(),
        r#"#!/bin/sh
for last; do :; done
printf 'frame=1 fps=30 time=00:00:02.00 bitrate=1k\r' >&2
printf 'frame=2 fps=30 time=00:00:05.00 bitrate=1k\r' >&2
printf 'frame=3 fps=30 time=00:00:08.50 bitrate=1k\r' >&2
: > "$last"
exit 0
"#,
    );

    let output = dir.path().join("out.mp4");
    let cmd = FfmpegCommand::new(dir.path().join("in.mp4"), &output, CompressionSettings::default());

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    FfmpegRunner::new(tools)
        .run_with_progress(&cmd, 10.0, move |pct| sink.lock().unwrap().push(pct))
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(*seen, vec![20, 50, 85, 100]);
    for pair in seen.windows(2) {
        assert!(pair[0] <= pair[1]);
    }
    assert!(output.exists());
}

#[tokio::test]
async fn failure_attaches_full_stderr() {
    let dir = TempDir::new().unwrap();
    let tools = tools_with_ffmpeg(
        dir.path(),
        r#"#!/bin/sh
echo "Unknown encoder 'libnope'" >&2
exit 1
"#,
    );

    let cmd = FfmpegCommand::new("in.mp4", "out.mp4", CompressionSettings::default());
    let err = FfmpegRunner::new(tools)
        .run_with_progress(&cmd, 10.0, |_| {})
        .await
        .unwrap_err();

    match err {
        MediaError::FfmpegFailed {
            stderr, exit_code, ..
        } => {
            assert!(stderr.contains("Unknown encoder 'libnope'"));
            assert_eq!(exit_code, Some(1));
        }
        other => panic!("expected FfmpegFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn cancellation_kills_the_child() {
    let dir = TempDir::new().unwrap();
    let tools = tools_with_ffmpeg(
        dir.path(),
        r#"#!/bin/sh
sleep 30
exit 0
"#,
    );

    let (cancel_tx, cancel_rx) = tokio::sync::watch::channel(false);
    let cmd = FfmpegCommand::new("in.mp4", "out.mp4", CompressionSettings::default());
    let runner = FfmpegRunner::new(tools).with_cancel(cancel_rx);

    let run = tokio::spawn(async move { runner.run_with_progress(&cmd, 10.0, |_| {}).await });

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    cancel_tx.send(true).unwrap();

    let result = tokio::time::timeout(std::time::Duration::from_secs(5), run)
        .await
        .expect("cancellation must not hang")
        .unwrap();
    assert!(matches!(result, Err(MediaError::Cancelled)));
}
