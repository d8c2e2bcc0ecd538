// Rust guideline compliant 2026-02-06

//! Line sources over plain or gzip-compressed input.
//!
//! This module provides the [`LineSource`] abstraction used by the merge,
//! a generic [`TextLines`] implementation over any [`BufRead`], and [`open`],
//! which picks plain or decompressed reading from the file's magic bytes.

use crate::{Error, Result};
use flate2::read::MultiGzDecoder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Read};
use std::path::Path;

/// Magic number at the start of every gzip member.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

const UTF8_BOM: [u8; 3] = [0xef, 0xbb, 0xbf];

/// A forward-only, non-restartable sequence of text lines.
pub trait LineSource {
    /// Human-readable name of the source, used in errors and logs.
    fn label(&self) -> &str;

    /// Returns the next line without its terminator.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying stream fails or the line cannot be
    /// decoded under the source's [`Encoding`].
    fn next_line(&mut self) -> Result<Option<String>>;

    /// Releases the underlying handle.
    ///
    /// Safe to call more than once; later calls to [`LineSource::next_line`]
    /// return `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if releasing the handle fails.
    fn close(&mut self) -> Result<()>;
}

/// How raw bytes are turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// Invalid UTF-8 sequences are replaced with U+FFFD.
    #[default]
    Utf8Lossy,
    /// Invalid UTF-8 fails the read with [`Error::UnsupportedEncoding`].
    Utf8Strict,
}

/// Compression detected on an input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Plain text.
    Plain,
    /// Gzip, possibly multi-member.
    Gzip,
}

impl Compression {
    /// Classifies a stream from its leading bytes.
    pub fn detect(head: &[u8]) -> Self {
        if head.starts_with(&GZIP_MAGIC) {
            Compression::Gzip
        } else {
            Compression::Plain
        }
    }
}

/// Line reader over any buffered byte stream.
///
/// Strips `\n` and `\r\n` terminators and a leading UTF-8 byte-order mark.
pub struct TextLines<R> {
    label: String,
    reader: Option<R>,
    encoding: Encoding,
    line_number: u64,
    buf: Vec<u8>,
}

impl<R: BufRead> TextLines<R> {
    /// Creates a line reader.
    ///
    /// # Arguments
    ///
    /// * `label` - Name used in errors and logs
    /// * `reader` - The byte stream, already decompressed
    /// * `encoding` - Decoding policy
    pub fn new(label: impl Into<String>, reader: R, encoding: Encoding) -> Self {
        Self {
            label: label.into(),
            reader: Some(reader),
            encoding,
            line_number: 0,
            buf: Vec::new(),
        }
    }

    /// Number of lines returned so far.
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    fn decode(&self, bytes: Vec<u8>) -> Result<String> {
        match String::from_utf8(bytes) {
            Ok(line) => Ok(line),
            Err(err) => match self.encoding {
                Encoding::Utf8Lossy => Ok(String::from_utf8_lossy(err.as_bytes()).into_owned()),
                Encoding::Utf8Strict => Err(Error::UnsupportedEncoding(format!(
                    "{}: line {} is not valid UTF-8",
                    self.label, self.line_number
                ))),
            },
        }
    }
}

impl<R: BufRead> LineSource for TextLines<R> {
    fn label(&self) -> &str {
        &self.label
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };

        self.buf.clear();
        if reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }

        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }
        if self.line_number == 0 && self.buf.starts_with(&UTF8_BOM) {
            self.buf.drain(..UTF8_BOM.len());
        }
        self.line_number += 1;

        let bytes = std::mem::take(&mut self.buf);
        self.decode(bytes).map(Some)
    }

    fn close(&mut self) -> Result<()> {
        self.reader = None;
        Ok(())
    }
}

/// Opens a log file, decompressing it when it starts with the gzip magic.
///
/// The magic bytes are sniffed from the same handle that is then read, so
/// the file is opened exactly once.
///
/// # Arguments
///
/// * `path` - File to open
/// * `encoding` - Decoding policy for its lines
///
/// # Errors
///
/// Returns an error if:
/// - The path does not exist, is unreadable or is a directory ([`Error::FileNotFound`])
/// - Reading the leading bytes fails ([`Error::Io`])
pub fn open(path: &Path, encoding: Encoding) -> Result<Box<dyn LineSource>> {
    let mut file = File::open(path).map_err(|e| Error::from_open(path.to_path_buf(), e))?;
    if file.metadata()?.is_dir() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "is a directory"),
        });
    }

    let mut magic = [0u8; 2];
    let read = read_prefix(&mut file, &mut magic)?;
    let compression = Compression::detect(&magic[..read]);
    let stream = Cursor::new(magic).take(read as u64).chain(file);
    let label = path.display().to_string();

    tracing::debug!(path = %label, ?compression, "opened log source");

    let source: Box<dyn LineSource> = match compression {
        Compression::Gzip => Box::new(TextLines::new(
            label,
            BufReader::new(MultiGzDecoder::new(stream)),
            encoding,
        )),
        Compression::Plain => Box::new(TextLines::new(label, BufReader::new(stream), encoding)),
    };
    Ok(source)
}

fn read_prefix(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines_of(bytes: &[u8], encoding: Encoding) -> Result<Vec<String>> {
        let mut source = TextLines::new("mem", Cursor::new(bytes.to_vec()), encoding);
        let mut out = Vec::new();
        while let Some(line) = source.next_line()? {
            out.push(line);
        }
        Ok(out)
    }

    #[test]
    fn test_strips_terminators_and_bom() {
        let lines = lines_of(b"\xef\xbb\xbffirst\r\nsecond\nthird", Encoding::Utf8Lossy).unwrap();
        assert_eq!(lines, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_keeps_empty_lines() {
        let lines = lines_of(b"a\n\nb\n", Encoding::Utf8Lossy).unwrap();
        assert_eq!(lines, vec!["a", "", "b"]);
    }

    #[test]
    fn test_lossy_replaces_invalid_utf8() {
        let lines = lines_of(b"ok\nbad \xff byte\n", Encoding::Utf8Lossy).unwrap();
        assert_eq!(lines[1], "bad \u{fffd} byte");
    }

    #[test]
    fn test_strict_rejects_invalid_utf8() {
        let err = lines_of(b"ok\nbad \xff byte\n", Encoding::Utf8Strict).unwrap_err();
        assert!(matches!(err, Error::UnsupportedEncoding(ref msg) if msg.contains("line 2")));
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut source = TextLines::new("mem", Cursor::new(b"a\nb\n".to_vec()), Encoding::Utf8Lossy);
        assert_eq!(source.next_line().unwrap().as_deref(), Some("a"));
        source.close().unwrap();
        source.close().unwrap();
        assert!(source.next_line().unwrap().is_none());
    }

    #[test]
    fn test_detects_gzip_magic() {
        assert_eq!(Compression::detect(&[0x1f, 0x8b, 0x08]), Compression::Gzip);
        assert_eq!(Compression::detect(&[0x1f]), Compression::Plain);
        assert_eq!(Compression::detect(b"20"), Compression::Plain);
        assert_eq!(Compression::detect(&[]), Compression::Plain);
    }
}
