// Rust guideline compliant 2026-02-06

//! Logmerge CLI library.
//!
//! This library exposes the CLI modules for use in tests and external code.

pub mod cli;
pub mod logging;

pub use cli::{exit_code, Cli, MarkerLabelArg};
pub use logging::{init_tracing, LoggingError};
