// Rust guideline compliant 2026-02-06

//! One merge input with a single-group lookahead.
//!
//! A [`MergeSource`] reads its [`LineSource`] one group at a time: a
//! timestamped line followed by every continuation line up to the next
//! parseable timestamp. The line that ends a group is held back as the head
//! of the next one, so the source never reads further than one timestamp
//! boundary ahead.

use crate::line_source::LineSource;
use crate::timestamp::{GroupTime, Timestamp, TimestampExtractor};
use crate::Result;
use std::fmt;
use std::sync::Arc;

struct Group {
    time: GroupTime,
    lines: Vec<String>,
}

/// A line source paired with the shared timestamp extractor.
pub struct MergeSource {
    index: usize,
    marker: String,
    lines: Box<dyn LineSource>,
    extractor: Arc<TimestampExtractor>,
    pending: Option<Group>,
    next_head: Option<(Timestamp, String)>,
    exhausted: bool,
    closed: bool,
    lines_emitted: u64,
}

impl MergeSource {
    /// Creates a merge source.
    ///
    /// # Arguments
    ///
    /// * `index` - Input-order position; smaller wins timestamp ties
    /// * `marker` - Label written in front of lines when marker mode is on
    /// * `lines` - The underlying line stream
    /// * `extractor` - Timestamp extractor shared by all sources of a run
    pub fn new(
        index: usize,
        marker: impl Into<String>,
        lines: Box<dyn LineSource>,
        extractor: Arc<TimestampExtractor>,
    ) -> Self {
        Self {
            index,
            marker: marker.into(),
            lines,
            extractor,
            pending: None,
            next_head: None,
            exhausted: false,
            closed: false,
            lines_emitted: 0,
        }
    }

    /// Input-order position of this source.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Marker label of this source.
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Number of lines handed out by [`MergeSource::drain_lines`] so far.
    pub fn lines_emitted(&self) -> u64 {
        self.lines_emitted
    }

    /// Returns the time of the next group without consuming it.
    ///
    /// Reads from the line source only when no group is buffered. Repeated
    /// calls without an intervening drain return the same value.
    ///
    /// # Returns
    ///
    /// The pending group's time, or `None` once the source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the underlying stream fails.
    pub fn peek_next_timestamp(&mut self) -> Result<Option<GroupTime>> {
        if self.pending.is_none() {
            self.fill()?;
        }
        Ok(self.pending.as_ref().map(|group| group.time))
    }

    /// Consumes the pending group and buffers the following one.
    ///
    /// # Returns
    ///
    /// The group's lines in their original order.
    ///
    /// # Errors
    ///
    /// Returns an error if refilling the lookahead fails.
    ///
    /// # Panics
    ///
    /// Panics if no group is pending, i.e. if
    /// [`MergeSource::peek_next_timestamp`] has not returned `Some` since the
    /// last drain.
    pub fn drain_lines(&mut self) -> Result<Vec<String>> {
        let Some(group) = self.pending.take() else {
            panic!(
                "drain_lines called on source {} without a pending group",
                self.index
            );
        };
        self.lines_emitted += group.lines.len() as u64;
        self.fill()?;
        Ok(group.lines)
    }

    /// Releases the underlying line source. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the line source fails to close.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.lines.close()
    }

    fn fill(&mut self) -> Result<()> {
        let (time, head) = match self.next_head.take() {
            Some((ts, line)) => (GroupTime::At(ts), line),
            None => match self.read_line()? {
                Some(line) => match self.extractor.extract(&line) {
                    Some(ts) => (GroupTime::At(ts), line),
                    None => (GroupTime::Untimed, line),
                },
                None => return Ok(()),
            },
        };

        let mut lines = vec![head];
        while let Some(line) = self.read_line()? {
            if let Some(ts) = self.extractor.extract(&line) {
                self.next_head = Some((ts, line));
                break;
            }
            lines.push(line);
        }

        self.pending = Some(Group { time, lines });
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        if self.exhausted {
            return Ok(None);
        }
        if let Some(line) = self.lines.next_line()? {
            return Ok(Some(line));
        }

        self.exhausted = true;
        tracing::debug!(source = self.index, label = self.lines.label(), "source exhausted");
        if let Err(err) = self.close() {
            tracing::warn!(source = self.index, error = %err, "failed to close exhausted source");
        }
        Ok(None)
    }
}

impl fmt::Debug for MergeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeSource")
            .field("index", &self.index)
            .field("marker", &self.marker)
            .field("label", &self.lines.label())
            .field("pending", &self.pending.as_ref().map(|g| g.time))
            .field("exhausted", &self.exhausted)
            .finish()
    }
}

/// Closes every source, logging and discarding close failures.
pub(crate) fn close_all(sources: &mut [MergeSource]) {
    for source in sources {
        if let Err(err) = source.close() {
            tracing::warn!(source = source.index, error = %err, "failed to close source");
        }
    }
}
