// Rust guideline compliant 2026-02-06

//! Run orchestration: validate, open inputs, merge, finish the sink.

use crate::config::MergeConfig;
use crate::engine::{MergeEngine, MergeStats};
use crate::line_source;
use crate::merge_source::{self, MergeSource};
use crate::sink::Sink;
use crate::timestamp::TimestampExtractor;
use crate::Result;
use std::io::Write;
use std::sync::Arc;

/// A validated merge run.
#[derive(Debug)]
pub struct LogMerger {
    config: MergeConfig,
    extractor: Arc<TimestampExtractor>,
}

impl LogMerger {
    /// Validates `config` and prepares the shared timestamp extractor.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfiguration`] if the input list is
    /// empty or the timestamp format is invalid.
    pub fn new(config: MergeConfig) -> Result<Self> {
        config.validate()?;
        let extractor = Arc::new(TimestampExtractor::from_pattern(&config.timestamp_format)?);
        Ok(Self { config, extractor })
    }

    /// The configuration this merger runs with.
    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Opens every input in order.
    ///
    /// On the first failure the sources opened so far are closed and the
    /// error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::FileNotFound`] for a missing or unreadable
    /// input, [`crate::Error::Io`] for other open failures.
    pub fn open_sources(&self) -> Result<Vec<MergeSource>> {
        let mut sources = Vec::with_capacity(self.config.log_files.len());
        for (index, path) in self.config.log_files.iter().enumerate() {
            match line_source::open(path, self.config.encoding) {
                Ok(lines) => {
                    let marker = self.config.marker_label.label_for(index, path);
                    sources.push(MergeSource::new(index, marker, lines, Arc::clone(&self.extractor)));
                }
                Err(err) => {
                    merge_source::close_all(&mut sources);
                    return Err(err);
                }
            }
        }
        Ok(sources)
    }

    /// Merges into the configured destination.
    ///
    /// Inputs are opened before the output, so a missing input never
    /// creates an output file.
    ///
    /// # Errors
    ///
    /// Returns the first open, read or write error.
    pub fn run(&self) -> Result<MergeStats> {
        let engine = MergeEngine::new(self.open_sources()?, self.config.emit_options());
        let mut sink = Sink::open(self.config.output_file.as_deref(), self.config.gzipped_output)?;
        tracing::debug!(sink = sink.kind(), inputs = self.config.log_files.len(), "starting merge");

        let stats = engine.run(&mut sink)?;
        sink.finish()?;
        Ok(stats)
    }

    /// Merges into a caller-supplied writer, ignoring the configured output.
    ///
    /// # Errors
    ///
    /// Returns the first open, read or write error.
    pub fn run_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<MergeStats> {
        let engine = MergeEngine::new(self.open_sources()?, self.config.emit_options());
        engine.run(writer)
    }
}
