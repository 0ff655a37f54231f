//! Engine configuration.

use std::path::PathBuf;

/// Worker cap regardless of core count; more segments stop amortizing the
/// split/concat overhead.
pub const MAX_SEGMENT_WORKERS: usize = 8;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Parallel segment workers (and the `-threads` hint for fast runs)
    pub max_workers: usize,
    /// Where scoped segment directories are created
    pub work_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_workers: num_cpus::get().min(MAX_SEGMENT_WORKERS),
            work_dir: std::env::temp_dir(),
        }
    }
}

impl EngineConfig {
    /// Create config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_workers: std::env::var("VPRESS_MAX_WORKERS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(|n: usize| n.clamp(1, MAX_SEGMENT_WORKERS))
                .unwrap_or(defaults.max_workers),
            work_dir: std::env::var("VPRESS_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
        }
    }
}
