//! Persistent, fingerprint-keyed store of prior video analyses.
//!
//! Entries are keyed by an MD5 fingerprint of `(path, size, mod_time)`, so a
//! touched or rewritten file never matches a stale analysis. Both explicit
//! invalidation and age expiry mark rows invalid without deleting them;
//! physical deletion only happens through [`AnalysisCache::clean_expired`]
//! or [`AnalysisCache::clear_all`].

mod entry;
mod error;
mod fingerprint;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use vpress_models::{VideoAnalysis, VideoFile};

pub use entry::CacheEntry;
pub use error::{CacheError, CacheResult};
pub use fingerprint::fingerprint_file;

/// Persistent analysis cache backed by a single SQLite file.
pub struct AnalysisCache {
    conn: Mutex<Connection>,
    max_age_hours: i64,
}

impl AnalysisCache {
    /// Open (or create) the cache at `db_path`.
    pub fn open(db_path: impl AsRef<Path>, max_age_hours: i64) -> CacheResult<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;

            CREATE TABLE IF NOT EXISTS video_analysis (
                fingerprint TEXT PRIMARY KEY,
                video_path TEXT NOT NULL,
                size_bytes INTEGER NOT NULL,
                mod_time TIMESTAMP NOT NULL,
                date_cached TIMESTAMP NOT NULL,
                analysis_blob BLOB NOT NULL,
                videofile_blob BLOB NOT NULL,
                duration REAL NOT NULL,
                resolution TEXT NOT NULL,
                codec TEXT NOT NULL,
                valid BOOLEAN NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_video_path ON video_analysis(video_path);
            CREATE INDEX IF NOT EXISTS idx_date_cached ON video_analysis(date_cached);
            "#,
        )?;

        debug!(db = %db_path.display(), max_age_hours, "Opened analysis cache");
        Ok(Self {
            conn: Mutex::new(conn),
            max_age_hours,
        })
    }

    /// Open the cache at its default per-user location.
    pub fn open_default(max_age_hours: i64) -> CacheResult<Self> {
        Self::open(default_db_path(), max_age_hours)
    }

    /// Look up a cached analysis for `path`.
    ///
    /// Returns `None` on any miss: unknown fingerprint, expired entry or a
    /// store failure. An expired entry has its `valid` flag flipped to false
    /// but stays in the table. Store failures degrade to a cold analysis
    /// rather than failing the pipeline.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<(VideoAnalysis, VideoFile)> {
        let path = path.as_ref();
        match self.try_get(path) {
            Ok(hit) => hit,
            Err(e) => {
                warn!(path = %path.display(), "Cache read failed, treating as miss: {e}");
                None
            }
        }
    }

    fn try_get(&self, path: &Path) -> CacheResult<Option<(VideoAnalysis, VideoFile)>> {
        let fingerprint = fingerprint_file(path)?;
        let conn = self.conn.lock().expect("cache mutex poisoned");

        let row: Option<(Vec<u8>, Vec<u8>, DateTime<Utc>)> = conn
            .query_row(
                "SELECT analysis_blob, videofile_blob, date_cached
                 FROM video_analysis
                 WHERE fingerprint = ?1 AND valid = TRUE",
                params![fingerprint],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        let Some((analysis_blob, videofile_blob, date_cached)) = row else {
            return Ok(None);
        };

        if Utc::now() - date_cached > Duration::hours(self.max_age_hours) {
            debug!(path = %path.display(), %date_cached, "Cache entry expired, invalidating");
            conn.execute(
                "UPDATE video_analysis SET valid = FALSE WHERE fingerprint = ?1",
                params![fingerprint],
            )?;
            return Ok(None);
        }

        let analysis: VideoAnalysis = serde_json::from_slice(&analysis_blob)?;
        let video_file: VideoFile = serde_json::from_slice(&videofile_blob)?;
        debug!(path = %path.display(), "Cache hit");
        Ok(Some((analysis, video_file)))
    }

    /// Store an analysis for `path`, replacing any previous entry for the
    /// same fingerprint.
    pub fn put(
        &self,
        path: impl AsRef<Path>,
        analysis: &VideoAnalysis,
        video_file: &VideoFile,
    ) -> CacheResult<()> {
        let path = path.as_ref();
        let fingerprint = fingerprint_file(path)?;
        let metadata = std::fs::metadata(path)?;
        let mod_time: DateTime<Utc> = metadata.modified()?.into();

        let analysis_blob = serde_json::to_vec(analysis)?;
        let videofile_blob = serde_json::to_vec(video_file)?;

        let conn = self.conn.lock().expect("cache mutex poisoned");
        conn.execute(
            "INSERT OR REPLACE INTO video_analysis
             (fingerprint, video_path, size_bytes, mod_time, date_cached,
              analysis_blob, videofile_blob, duration, resolution, codec, valid)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, TRUE)",
            params![
                fingerprint,
                path.to_string_lossy(),
                metadata.len() as i64,
                mod_time,
                Utc::now(),
                analysis_blob,
                videofile_blob,
                video_file.duration_seconds,
                video_file.resolution(),
                video_file.video.codec,
            ],
        )?;

        debug!(path = %path.display(), "Cached analysis");
        Ok(())
    }

    /// Mark the entry for `path` invalid, if any. The row stays in the
    /// table; physical deletion only happens through [`Self::clean_expired`]
    /// or [`Self::clear_all`].
    pub fn invalidate(&self, path: impl AsRef<Path>) -> CacheResult<()> {
        let path = path.as_ref();
        let fingerprint = fingerprint_file(path)?;
        let conn = self.conn.lock().expect("cache mutex poisoned");
        conn.execute(
            "UPDATE video_analysis SET valid = FALSE WHERE fingerprint = ?1",
            params![fingerprint],
        )?;
        debug!(path = %path.display(), "Invalidated cache entry");
        Ok(())
    }

    /// Physically delete entries older than the configured max age.
    pub fn clean_expired(&self) -> CacheResult<usize> {
        let cutoff = Utc::now() - Duration::hours(self.max_age_hours);
        let conn = self.conn.lock().expect("cache mutex poisoned");
        let removed = conn.execute(
            "DELETE FROM video_analysis WHERE date_cached < ?1",
            params![cutoff],
        )?;
        if removed > 0 {
            info!(removed, "Cleaned expired cache entries");
        }
        Ok(removed)
    }

    /// Delete every entry.
    pub fn clear_all(&self) -> CacheResult<usize> {
        let conn = self.conn.lock().expect("cache mutex poisoned");
        let removed = conn.execute("DELETE FROM video_analysis", [])?;
        info!(removed, "Cleared analysis cache");
        Ok(removed)
    }

    /// Total and valid entry counts.
    pub fn stats(&self) -> CacheResult<(u64, u64)> {
        let conn = self.conn.lock().expect("cache mutex poisoned");
        let total: u64 =
            conn.query_row("SELECT COUNT(*) FROM video_analysis", [], |row| row.get(0))?;
        let valid: u64 = conn.query_row(
            "SELECT COUNT(*) FROM video_analysis WHERE valid = TRUE",
            [],
            |row| row.get(0),
        )?;
        Ok((total, valid))
    }

    /// Find up to five valid entries matching `resolution` and `codec` whose
    /// duration lies within `tolerance` (a fraction) of `duration`, newest
    /// first.
    pub fn find_similar(
        &self,
        resolution: &str,
        duration: f64,
        codec: &str,
        tolerance: f64,
    ) -> CacheResult<Vec<CacheEntry>> {
        let min_duration = duration * (1.0 - tolerance);
        let max_duration = duration * (1.0 + tolerance);

        let conn = self.conn.lock().expect("cache mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT fingerprint, video_path, size_bytes, mod_time, date_cached,
                    analysis_blob, videofile_blob, duration, resolution, codec, valid
             FROM video_analysis
             WHERE resolution = ?1
               AND duration BETWEEN ?2 AND ?3
               AND codec = ?4
               AND valid = TRUE
             ORDER BY date_cached DESC
             LIMIT 5",
        )?;

        let entries = stmt
            .query_map(
                params![resolution, min_duration, max_duration, codec],
                CacheEntry::from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            resolution,
            duration, codec, found = entries.len(), "Similarity lookup"
        );
        Ok(entries)
    }

    /// Change the expiry horizon.
    pub fn set_max_age(&mut self, hours: i64) {
        self.max_age_hours = hours;
    }
}

/// Default location of the cache database: `~/.vpress/cache/analysis.db`.
pub fn default_db_path() -> PathBuf {
    let base = dirs::home_dir().unwrap_or_else(std::env::temp_dir);
    base.join(".vpress").join("cache").join("analysis.db")
}
