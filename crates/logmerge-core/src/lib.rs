// Rust guideline compliant 2026-02-06

//! Logmerge Core Library
//!
//! This crate merges timestamp-ordered log files into one chronological stream:
//! - Line sources over plain or gzip input (magic-byte detection)
//! - Leading-timestamp extraction with strftime or date-pattern formats
//! - Per-source one-group lookahead
//! - The streaming k-way merge engine
//! - Output sinks (stdout, plain file, gzip file)
//! - Configuration and error types

pub mod config;
pub mod engine;
pub mod error;
pub mod line_source;
pub mod merge_source;
pub mod merger;
pub mod sink;
pub mod timestamp;

pub use config::{MarkerLabel, MergeConfig};
pub use engine::{merge, EmitOptions, EngineState, MergeEngine, MergeStats};
pub use error::{Error, ErrorKind, Result};
pub use line_source::{Compression, Encoding, LineSource, TextLines};
pub use merge_source::MergeSource;
pub use merger::LogMerger;
pub use sink::Sink;
pub use timestamp::{GroupTime, Timestamp, TimestampExtractor, TimestampFormat};
