//! Persisted cache entry.

use chrono::{DateTime, Utc};
use rusqlite::Row;

/// One row of the `video_analysis` table.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Primary key: MD5 of (path, size, mod_time)
    pub fingerprint: String,
    /// Original path of the video file
    pub video_path: String,
    /// File size at cache time
    pub size_bytes: u64,
    /// File modification time at cache time
    pub mod_time: DateTime<Utc>,
    /// When the entry was written
    pub date_cached: DateTime<Utc>,
    /// Serialized `VideoAnalysis`
    pub analysis_blob: Vec<u8>,
    /// Serialized `VideoFile`
    pub videofile_blob: Vec<u8>,
    /// Duration in seconds
    pub duration: f64,
    /// Resolution as "WxH"
    pub resolution: String,
    /// Video codec
    pub codec: String,
    /// Whether the entry is still usable
    pub valid: bool,
}

impl CacheEntry {
    /// Map a full `SELECT *`-ordered row onto an entry.
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            fingerprint: row.get(0)?,
            video_path: row.get(1)?,
            size_bytes: row.get::<_, i64>(2)? as u64,
            mod_time: row.get(3)?,
            date_cached: row.get(4)?,
            analysis_blob: row.get(5)?,
            videofile_blob: row.get(6)?,
            duration: row.get(7)?,
            resolution: row.get(8)?,
            codec: row.get(9)?,
            valid: row.get(10)?,
        })
    }
}
