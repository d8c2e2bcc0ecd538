// Rust guideline compliant 2026-02-06

//! The k-way merge driver.
//!
//! The engine repeatedly peeks every source, picks the group with the
//! smallest `(GroupTime, input index)` key and writes it to the sink. It owns
//! its sources for the whole run and closes all of them on every exit path,
//! including early returns on error.

use crate::merge_source::{self, MergeSource};
use crate::timestamp::GroupTime;
use crate::Result;
use std::io::Write;

/// How emitted lines are decorated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// Prefix each line with `[marker]` followed by `delimiter`.
    pub marker: bool,
    /// Separator between the marker and the line.
    pub delimiter: String,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            marker: false,
            delimiter: " ".to_string(),
        }
    }
}

/// Counters collected while merging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Groups written to the sink.
    pub groups: u64,
    /// Lines written to the sink.
    pub lines: u64,
    /// Lines written per source, in the order the sources were supplied.
    pub lines_per_source: Vec<u64>,
}

/// Lifecycle of a [`MergeEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// At least one source may still have a pending group.
    Running,
    /// Every source is exhausted.
    Done,
}

/// Streaming k-way merge over a fixed, ordered set of sources.
#[derive(Debug)]
pub struct MergeEngine {
    sources: Vec<MergeSource>,
    options: EmitOptions,
    state: EngineState,
    stats: MergeStats,
}

impl MergeEngine {
    /// Creates an engine that owns `sources` until it is dropped.
    pub fn new(sources: Vec<MergeSource>, options: EmitOptions) -> Self {
        let stats = MergeStats {
            lines_per_source: vec![0; sources.len()],
            ..MergeStats::default()
        };
        Self {
            sources,
            options,
            state: EngineState::Running,
            stats,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Counters collected so far.
    pub fn stats(&self) -> &MergeStats {
        &self.stats
    }

    /// Writes the next group to `sink`.
    ///
    /// # Returns
    ///
    /// [`EngineState::Done`] once no source has a pending group; further
    /// calls are no-ops.
    ///
    /// # Errors
    ///
    /// Returns an error if reading a source or writing the sink fails. The
    /// engine is left as is; dropping it closes the sources.
    pub fn step<W: Write + ?Sized>(&mut self, sink: &mut W) -> Result<EngineState> {
        if self.state == EngineState::Done {
            return Ok(EngineState::Done);
        }

        let Some((position, time)) = self.select_next()? else {
            self.state = EngineState::Done;
            merge_source::close_all(&mut self.sources);
            tracing::info!(
                groups = self.stats.groups,
                lines = self.stats.lines,
                sources = self.sources.len(),
                "merge complete"
            );
            return Ok(EngineState::Done);
        };

        let source = &mut self.sources[position];
        let lines = source.drain_lines()?;
        tracing::trace!(source = source.index(), %time, lines = lines.len(), "emitting group");

        let prefix = self
            .options
            .marker
            .then(|| format!("[{}]{}", source.marker(), self.options.delimiter));
        for line in &lines {
            if let Some(prefix) = &prefix {
                sink.write_all(prefix.as_bytes())?;
            }
            sink.write_all(line.as_bytes())?;
            sink.write_all(b"\n")?;
        }
        sink.flush()?;

        self.stats.groups += 1;
        self.stats.lines += lines.len() as u64;
        self.stats.lines_per_source[position] += lines.len() as u64;
        Ok(EngineState::Running)
    }

    /// Runs the merge to completion.
    ///
    /// # Returns
    ///
    /// The collected [`MergeStats`].
    ///
    /// # Errors
    ///
    /// Returns the first read or write error. Every source is closed before
    /// the error reaches the caller.
    pub fn run<W: Write + ?Sized>(mut self, sink: &mut W) -> Result<MergeStats> {
        while self.step(sink)? == EngineState::Running {}
        Ok(std::mem::take(&mut self.stats))
    }

    /// Closes every source, ignoring close failures.
    pub fn close_all(&mut self) {
        merge_source::close_all(&mut self.sources);
    }

    fn select_next(&mut self) -> Result<Option<(usize, GroupTime)>> {
        let mut best: Option<(GroupTime, usize, usize)> = None;
        for (position, source) in self.sources.iter_mut().enumerate() {
            let Some(time) = source.peek_next_timestamp()? else {
                continue;
            };
            let wins = match best {
                None => true,
                Some((best_time, best_index, _)) => (time, source.index()) < (best_time, best_index),
            };
            if wins {
                best = Some((time, source.index(), position));
            }
        }
        Ok(best.map(|(time, _, position)| (position, time)))
    }
}

impl Drop for MergeEngine {
    fn drop(&mut self) {
        self.close_all();
    }
}

/// Merges `sources` into `sink` in timestamp order.
///
/// Groups are ordered by time, ties by the sources' input index. Leading
/// untimed groups come before every timestamped group. The sink is flushed
/// after each group.
///
/// # Arguments
///
/// * `sources` - Inputs; closed before this function returns
/// * `sink` - Destination for the merged lines
/// * `options` - Marker decoration
///
/// # Errors
///
/// Returns the first read or write error; all sources are closed first.
pub fn merge<W: Write + ?Sized>(
    sources: Vec<MergeSource>,
    sink: &mut W,
    options: &EmitOptions,
) -> Result<MergeStats> {
    MergeEngine::new(sources, options.clone()).run(sink)
}
