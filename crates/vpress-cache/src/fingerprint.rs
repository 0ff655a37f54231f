//! File fingerprinting.

use std::path::Path;

use chrono::{DateTime, Utc};
use md5::{Digest, Md5};

use crate::error::CacheResult;

/// Compute the cache fingerprint for a file: a 128-bit digest over its path,
/// decimal size and RFC 3339 modification time.
///
/// Identical `(path, size, mod_time)` always produces the identical
/// fingerprint; touching or rewriting the file changes it.
pub fn fingerprint_file(path: impl AsRef<Path>) -> CacheResult<String> {
    let path = path.as_ref();
    let metadata = std::fs::metadata(path)?;
    let mod_time: DateTime<Utc> = metadata.modified()?.into();

    let mut hasher = Md5::new();
    hasher.update(path.to_string_lossy().as_bytes());
    hasher.update(metadata.len().to_string().as_bytes());
    hasher.update(mod_time.to_rfc3339().as_bytes());

    let digest = hasher.finalize();
    Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
}
