// Rust guideline compliant 2026-02-06

//! Output destinations for merged lines.

use crate::Result;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufWriter, StdoutLock, Write};
use std::path::Path;

/// Where merged output goes.
pub enum Sink {
    /// Standard output.
    Stdout(BufWriter<StdoutLock<'static>>),
    /// A plain text file.
    File(BufWriter<File>),
    /// A gzip-compressed file.
    Gzip(GzEncoder<BufWriter<File>>),
}

impl Sink {
    /// Opens the configured destination.
    ///
    /// # Arguments
    ///
    /// * `output_file` - Target file, or `None` for standard output
    /// * `gzipped` - Compress the target file; ignored for standard output
    ///
    /// # Errors
    ///
    /// Returns an error if the output file cannot be created.
    pub fn open(output_file: Option<&Path>, gzipped: bool) -> Result<Self> {
        let Some(path) = output_file else {
            if gzipped {
                tracing::warn!("gzipped output requested without an output file; writing plain text to stdout");
            }
            return Ok(Sink::Stdout(BufWriter::new(io::stdout().lock())));
        };

        let file = BufWriter::new(File::create(path)?);
        tracing::debug!(path = %path.display(), gzipped, "opened output file");
        if gzipped {
            Ok(Sink::Gzip(GzEncoder::new(file, Compression::default())))
        } else {
            Ok(Sink::File(file))
        }
    }

    /// Short name of the destination kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Sink::Stdout(_) => "stdout",
            Sink::File(_) => "file",
            Sink::Gzip(_) => "gzip",
        }
    }

    /// Flushes all buffered output and completes the gzip trailer.
    ///
    /// # Errors
    ///
    /// Returns an error if the final write fails.
    pub fn finish(self) -> Result<()> {
        match self {
            Sink::Stdout(mut out) => out.flush()?,
            Sink::File(mut out) => out.flush()?,
            Sink::Gzip(encoder) => encoder.finish()?.flush()?,
        }
        Ok(())
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Sink::Stdout(out) => out.write(buf),
            Sink::File(out) => out.write(buf),
            Sink::Gzip(out) => out.write(buf),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            Sink::Stdout(out) => out.write_all(buf),
            Sink::File(out) => out.write_all(buf),
            Sink::Gzip(out) => out.write_all(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Sink::Stdout(out) => out.flush(),
            Sink::File(out) => out.flush(),
            Sink::Gzip(out) => out.flush(),
        }
    }
}
