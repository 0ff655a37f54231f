//! Output naming and video file discovery.

use std::path::{Path, PathBuf};

/// Suffix appended to default output names.
const OUTPUT_SUFFIX: &str = "_compressed";

/// Recognized video file extensions.
const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v", "mpg", "mpeg", "3gp",
];

/// Default output path for an input: `name.ext` becomes `name_compressed.ext`
/// in the same directory (or in `out_dir` when given).
pub fn default_output_path(input: &Path, out_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let name = match input.extension() {
        Some(ext) => format!("{stem}{OUTPUT_SUFFIX}.{}", ext.to_string_lossy()),
        None => format!("{stem}{OUTPUT_SUFFIX}"),
    };

    let dir = out_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    dir.join(name)
}

/// Whether a path looks like a video file, by extension.
pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            VIDEO_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Collect video files under `dir`, recursing when asked. Entries that cannot
/// be read are skipped. Results are sorted for deterministic processing order.
pub fn collect_video_files(dir: &Path, recursive: bool) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_into(dir, recursive, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_into(dir: &Path, recursive: bool, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let Ok(entry) = entry else { continue };
        let path = entry.path();
        if path.is_dir() {
            if recursive {
                let _ = collect_into(&path, recursive, files);
            }
        } else if is_video_file(&path) {
            files.push(path);
        }
    }
    Ok(())
}
