//! Integration tests requiring real ffmpeg/ffprobe binaries.
//!
//! Run with `cargo test -- --ignored` on a machine with FFmpeg installed.
#![cfg(unix)]

use std::path::Path;
use std::process::Stdio;

use tempfile::TempDir;
use tokio::process::Command;

use vpress_media::{merge_segments, split_segments, write_concat_list, FfmpegTools};

async fn generate_test_video(tools: &FfmpegTools, path: &Path, seconds: u32) {
    let status = Command::new(tools.ffmpeg())
        .args([
            "-f",
            "lavfi",
            "-i",
            &format!("testsrc=duration={seconds}:size=320x240:rate=25"),
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-y",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .unwrap();
    assert!(status.success(), "failed to generate test video");
}

async fn count_frames(tools: &FfmpegTools, path: &Path) -> u64 {
    let output = Command::new(tools.ffprobe())
        .args([
            "-v",
            "quiet",
            "-count_frames",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=nb_read_frames",
            "-of",
            "csv=p=0",
        ])
        .arg(path)
        .output()
        .await
        .unwrap();
    String::from_utf8_lossy(&output.stdout)
        .trim()
        .parse()
        .unwrap()
}

#[tokio::test]
#[ignore = "requires ffmpeg and ffprobe on PATH"]
async fn split_then_merge_preserves_frame_count() {
    let tools = FfmpegTools::discover().unwrap();
    let dir = TempDir::new().unwrap();

    let source = dir.path().join("source.mp4");
    generate_test_video(&tools, &source, 8).await;
    let source_frames = count_frames(&tools, &source).await;
    assert!(source_frames > 0);

    let segments = split_segments(&tools, &source, dir.path(), 2.0, 4)
        .await
        .unwrap();
    assert_eq!(segments.len(), 4);

    let list = write_concat_list(dir.path(), &segments).await.unwrap();
    let merged = dir.path().join("merged.mp4");
    merge_segments(&tools, &list, &merged).await.unwrap();

    let merged_frames = count_frames(&tools, &merged).await;
    assert_eq!(
        merged_frames, source_frames,
        "stream-copy split+merge must reproduce every frame"
    );
}

#[tokio::test]
#[ignore = "requires ffprobe on PATH"]
async fn probe_reads_generated_video() {
    let tools = FfmpegTools::discover().unwrap();
    let dir = TempDir::new().unwrap();

    let source = dir.path().join("probe_me.mp4");
    generate_test_video(&tools, &source, 3).await;

    let info = vpress_media::probe_file(&tools, &source).await.unwrap();
    assert_eq!(info.video.width, 320);
    assert_eq!(info.video.height, 240);
    assert!((info.video.fps - 25.0).abs() < 0.5);
    assert!(info.duration_seconds > 2.5 && info.duration_seconds < 3.5);
}
