//! Concat-demuxer merging of encoded segments.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{MediaError, MediaResult};
use crate::tools::FfmpegTools;

/// Write the concat list file for `segments`, in the given order.
///
/// Entries are `file 'name'` lines with paths relative to the list file's
/// directory. The list is assembled in one shot after all workers finish, so
/// no synchronization is needed around it.
pub async fn write_concat_list(dir: &Path, segments: &[PathBuf]) -> MediaResult<PathBuf> {
    let list_path = dir.join("segments.txt");
    let mut contents = String::new();
    for segment in segments {
        let name = segment
            .file_name()
            .ok_or_else(|| MediaError::FileNotFound(segment.clone()))?;
        contents.push_str(&format!("file '{}'\n", name.to_string_lossy()));
    }
    tokio::fs::write(&list_path, contents).await?;
    debug!(list = %list_path.display(), entries = segments.len(), "Wrote concat list");
    Ok(list_path)
}

/// Stream-copy concatenate the segments named by `list_file` into `output`.
pub async fn merge_segments(
    tools: &FfmpegTools,
    list_file: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> MediaResult<()> {
    let list_file = list_file.as_ref();
    let output_path = output.as_ref();

    let output = Command::new(tools.ffmpeg())
        .args(["-f", "concat", "-safe", "0", "-i"])
        .arg(list_file)
        .args(["-c", "copy", "-y"])
        .arg(output_path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::ffmpeg_failed(
            format!("failed to merge segments into {}", output_path.display()),
            String::from_utf8_lossy(&output.stderr).into_owned(),
            output.status.code(),
        ));
    }

    info!(output = %output_path.display(), "Merged segments");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn concat_list_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let segments = vec![
            dir.path().join("out_0000.mp4"),
            dir.path().join("out_0001.mp4"),
            dir.path().join("out_0002.mp4"),
        ];
        let list = write_concat_list(dir.path(), &segments).await.unwrap();
        let contents = tokio::fs::read_to_string(&list).await.unwrap();
        assert_eq!(
            contents,
            "file 'out_0000.mp4'\nfile 'out_0001.mp4'\nfile 'out_0002.mp4'\n"
        );
    }
}
