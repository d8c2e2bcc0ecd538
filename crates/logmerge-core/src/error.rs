// Rust guideline compliant 2026-02-06

//! Error types for the logmerge core library.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for logmerge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for logmerge operations.
///
/// Every variant is fatal to a merge run; there is no per-source recovery.
#[derive(Debug, Error)]
pub enum Error {
    /// An input path does not exist or cannot be read.
    #[error("File not found: {}: {source}", .path.display())]
    FileNotFound {
        /// The input path as given.
        path: PathBuf,
        /// The underlying open failure.
        #[source]
        source: std::io::Error,
    },

    /// Input text could not be decoded with the required encoding.
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// Any other read or write failure, including corrupt gzip streams.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration was rejected before the merge started.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Discriminant of [`Error`] for callers that only need the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [`Error::FileNotFound`].
    FileNotFound,
    /// See [`Error::UnsupportedEncoding`].
    UnsupportedEncoding,
    /// See [`Error::Io`].
    Io,
    /// See [`Error::InvalidConfiguration`].
    InvalidConfiguration,
}

impl Error {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::FileNotFound { .. } => ErrorKind::FileNotFound,
            Error::UnsupportedEncoding(_) => ErrorKind::UnsupportedEncoding,
            Error::Io(_) => ErrorKind::Io,
            Error::InvalidConfiguration(_) => ErrorKind::InvalidConfiguration,
        }
    }

    /// Classifies a failure to open an input file.
    ///
    /// Missing and unreadable paths become [`Error::FileNotFound`]; anything
    /// else stays an [`Error::Io`].
    pub(crate) fn from_open(path: PathBuf, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                Error::FileNotFound { path, source }
            }
            _ => Error::Io(source),
        }
    }
}
