//! Compression engine.
//!
//! Decides between a single FFmpeg pass and a segmented parallel pipeline
//! (split, per-segment encode, stream-copy concat), aggregates progress
//! across workers and assembles the [`vpress_models::CompressionResult`].

mod aggregator;
mod config;
mod engine;
mod error;
mod preset;
mod quality;

pub use aggregator::ProgressAggregator;
pub use config::EngineConfig;
pub use engine::{uses_parallel_strategy, Compressor};
pub use error::{EngineError, EngineResult};
pub use preset::apply_speed_preset;
pub use quality::estimate_frame_quality;
