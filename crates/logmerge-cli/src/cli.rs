// Rust guideline compliant 2026-02-06

//! Command-line arguments.

use clap::Parser;
use logmerge_core::{Encoding, ErrorKind, MarkerLabel, MergeConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "logmerge",
    version,
    about = "Merge timestamp-ordered log files into one chronological stream",
    long_about = "Merges plain or gzip-compressed log files by their leading timestamps. Lines without a timestamp stay attached to the record above them. Equal timestamps are emitted in the order the files were given.",
    after_help = "Examples:\n  logmerge app.log db.log.gz\n  logmerge -t 'yyyy-MM-dd HH:mm:ss,SSS' --marker a.log b.log\n  logmerge --marker --marker-label file-name -o merged.log.gz --gzip api.log worker.log\n  logmerge --config logmerge.toml\n"
)]
pub struct Cli {
    /// Log files to merge, in priority order
    pub log_files: Vec<PathBuf>,

    /// Timestamp pattern ('%' strftime syntax, otherwise yyyy-MM-dd HH:mm:ss style)
    #[arg(short, long)]
    pub timestamp_format: Option<String>,

    /// Prefix every line with [marker] and the delimiter
    #[arg(short, long)]
    pub marker: bool,

    /// Separator between marker and line
    #[arg(short, long, allow_hyphen_values = true)]
    pub delimiter: Option<String>,

    /// How source markers are labelled
    #[arg(long, value_enum)]
    pub marker_label: Option<MarkerLabelArg>,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output_file: Option<PathBuf>,

    /// Gzip the output file
    #[arg(short = 'z', long = "gzip")]
    pub gzipped_output: bool,

    /// Fail on invalid UTF-8 instead of replacing it
    #[arg(long)]
    pub strict_utf8: bool,

    /// Configuration file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Diagnostic log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Write diagnostics to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum MarkerLabelArg {
    Index,
    FileName,
    Path,
}

impl From<MarkerLabelArg> for MarkerLabel {
    fn from(arg: MarkerLabelArg) -> Self {
        match arg {
            MarkerLabelArg::Index => MarkerLabel::Index,
            MarkerLabelArg::FileName => MarkerLabel::FileName,
            MarkerLabelArg::Path => MarkerLabel::Path,
        }
    }
}

impl Cli {
    /// Overrides `config` with every option given on the command line.
    pub fn apply_to(&self, config: &mut MergeConfig) {
        if !self.log_files.is_empty() {
            config.log_files = self.log_files.clone();
        }
        if let Some(format) = &self.timestamp_format {
            config.timestamp_format = format.clone();
        }
        if self.marker {
            config.marker = true;
        }
        if let Some(delimiter) = &self.delimiter {
            config.delimiter = delimiter.clone();
        }
        if let Some(label) = self.marker_label {
            config.marker_label = label.into();
        }
        if let Some(output) = &self.output_file {
            config.output_file = Some(output.clone());
        }
        if self.gzipped_output {
            config.gzipped_output = true;
        }
        if self.strict_utf8 {
            config.encoding = Encoding::Utf8Strict;
        }
    }

    /// Loads the config file and environment, then applies these arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file or an environment override is invalid.
    pub fn load_config(&self) -> logmerge_core::Result<MergeConfig> {
        let mut config = MergeConfig::load(self.config.as_deref())?;
        self.apply_to(&mut config);
        Ok(config)
    }
}

/// Process exit status for a failed run.
///
/// Each core error kind gets its own status; anything else exits with 1.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<logmerge_core::Error>().map(|e| e.kind()) {
        Some(ErrorKind::InvalidConfiguration) => 2,
        Some(ErrorKind::FileNotFound) => 3,
        Some(ErrorKind::UnsupportedEncoding) => 4,
        Some(ErrorKind::Io) => 5,
        None => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("logmerge").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn test_parses_full_command_line() {
        let cli = parse(&[
            "-t",
            "HH:mm:ss",
            "--marker",
            "-d",
            " | ",
            "--marker-label",
            "file-name",
            "-o",
            "out.gz",
            "--gzip",
            "--strict-utf8",
            "a.log",
            "b.log",
        ]);
        assert_eq!(cli.log_files, vec![PathBuf::from("a.log"), PathBuf::from("b.log")]);
        assert_eq!(cli.timestamp_format.as_deref(), Some("HH:mm:ss"));
        assert!(cli.marker);
        assert_eq!(cli.delimiter.as_deref(), Some(" | "));
        assert_eq!(cli.marker_label, Some(MarkerLabelArg::FileName));
        assert_eq!(cli.output_file, Some(PathBuf::from("out.gz")));
        assert!(cli.gzipped_output);
        assert!(cli.strict_utf8);
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn test_delimiter_may_start_with_hyphen() {
        let cli = parse(&["-d", "-", "a.log"]);
        assert_eq!(cli.delimiter.as_deref(), Some("-"));
    }

    #[test]
    fn test_arguments_override_config() {
        let cli = parse(&["--marker", "-d", "\t", "--strict-utf8", "x.log"]);
        let mut config = MergeConfig {
            log_files: vec![PathBuf::from("from-file.log")],
            delimiter: ";".to_string(),
            ..MergeConfig::default()
        };
        cli.apply_to(&mut config);
        assert_eq!(config.log_files, vec![PathBuf::from("x.log")]);
        assert!(config.marker);
        assert_eq!(config.delimiter, "\t");
        assert_eq!(config.encoding, Encoding::Utf8Strict);
    }

    #[test]
    fn test_absent_arguments_keep_config() {
        let cli = parse(&[]);
        let mut config = MergeConfig {
            log_files: vec![PathBuf::from("from-file.log")],
            marker: true,
            gzipped_output: true,
            ..MergeConfig::default()
        };
        let before = config.clone();
        cli.apply_to(&mut config);
        assert_eq!(config, before);
    }

    #[test]
    fn test_exit_codes_by_kind() {
        let invalid = anyhow::Error::from(logmerge_core::Error::InvalidConfiguration("x".into()));
        assert_eq!(exit_code(&invalid), 2);

        let missing: anyhow::Result<()> = Err(logmerge_core::Error::FileNotFound {
            path: PathBuf::from("a.log"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        })
        .context("merge failed");
        assert_eq!(exit_code(&missing.unwrap_err()), 3);

        assert_eq!(exit_code(&anyhow::anyhow!("something else")), 1);
    }
}
