// Rust guideline compliant 2026-02-06

//! Configuration management for logmerge.

use crate::engine::EmitOptions;
use crate::line_source::Encoding;
use crate::timestamp::TimestampFormat;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How a source's marker label is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerLabel {
    /// Zero-based input position (`0`, `1`, ...).
    #[default]
    Index,
    /// Final component of the input path.
    FileName,
    /// The input path as given.
    Path,
}

impl MarkerLabel {
    /// Builds the label for the input at `index` read from `path`.
    pub fn label_for(&self, index: usize, path: &Path) -> String {
        match self {
            MarkerLabel::Index => index.to_string(),
            MarkerLabel::FileName => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            MarkerLabel::Path => path.display().to_string(),
        }
    }
}

impl FromStr for MarkerLabel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "index" => Ok(MarkerLabel::Index),
            "file-name" | "file_name" => Ok(MarkerLabel::FileName),
            "path" => Ok(MarkerLabel::Path),
            other => Err(Error::InvalidConfiguration(format!(
                "marker label must be index, file-name, or path, got '{}'",
                other
            ))),
        }
    }
}

/// Configuration for a merge run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Input files; order sets tie-break priority and marker order.
    #[serde(default)]
    pub log_files: Vec<PathBuf>,

    /// Pattern of the leading timestamp.
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,

    /// Whether to prefix lines with their source marker.
    #[serde(default)]
    pub marker: bool,

    /// Separator between marker and line.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// How marker labels are derived.
    #[serde(default)]
    pub marker_label: MarkerLabel,

    /// Output file; standard output when unset.
    #[serde(default)]
    pub output_file: Option<PathBuf>,

    /// Whether to gzip the output file.
    #[serde(default)]
    pub gzipped_output: bool,

    /// Decoding policy for input lines.
    #[serde(default)]
    pub encoding: Encoding,
}

/// Default timestamp pattern.
fn default_timestamp_format() -> String {
    "yyyy-MM-dd HH:mm:ss".to_string()
}

/// Default marker delimiter.
fn default_delimiter() -> String {
    " ".to_string()
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            log_files: Vec::new(),
            timestamp_format: default_timestamp_format(),
            marker: false,
            delimiter: default_delimiter(),
            marker_label: MarkerLabel::default(),
            output_file: None,
            gzipped_output: false,
            encoding: Encoding::default(),
        }
    }
}

impl MergeConfig {
    /// Loads configuration from an optional file and environment variables.
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values
    /// 2. The TOML file at `config_file`, if given
    /// 3. Environment variables with `LOGMERGE_` prefix
    ///
    /// The result is not validated; command-line overrides usually follow,
    /// and [`MergeConfig::validate`] runs when the merger is built.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration file cannot be read
    /// - It contains invalid TOML
    /// - An environment variable holds an invalid value
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .map_err(|e| Error::from_open(path.to_path_buf(), e))?;
                Self::from_toml_str(&content)?
            }
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the document is invalid.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::InvalidConfiguration(format!("invalid config file: {}", e)))
    }

    /// Applies environment variable overrides.
    ///
    /// Supported environment variables:
    /// - `LOGMERGE_TIMESTAMP_FORMAT` - Timestamp pattern
    /// - `LOGMERGE_DELIMITER` - Marker delimiter
    /// - `LOGMERGE_MARKER` - Marker mode (true/false)
    /// - `LOGMERGE_MARKER_LABEL` - index, file-name, or path
    /// - `LOGMERGE_GZIPPED_OUTPUT` - Gzip the output file (true/false)
    /// - `LOGMERGE_STRICT_UTF8` - Reject invalid UTF-8 (true/false)
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds an invalid value.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(val) = lookup("LOGMERGE_TIMESTAMP_FORMAT") {
            self.timestamp_format = val;
        }

        if let Some(val) = lookup("LOGMERGE_DELIMITER") {
            self.delimiter = val;
        }

        if let Some(val) = lookup("LOGMERGE_MARKER") {
            self.marker = parse_bool("LOGMERGE_MARKER", &val)?;
        }

        if let Some(val) = lookup("LOGMERGE_MARKER_LABEL") {
            self.marker_label = val.parse()?;
        }

        if let Some(val) = lookup("LOGMERGE_GZIPPED_OUTPUT") {
            self.gzipped_output = parse_bool("LOGMERGE_GZIPPED_OUTPUT", &val)?;
        }

        if let Some(val) = lookup("LOGMERGE_STRICT_UTF8") {
            self.encoding = if parse_bool("LOGMERGE_STRICT_UTF8", &val)? {
                Encoding::Utf8Strict
            } else {
                Encoding::Utf8Lossy
            };
        }

        Ok(())
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if:
    /// - No input files are configured
    /// - The timestamp format is rejected
    pub fn validate(&self) -> Result<()> {
        if self.log_files.is_empty() {
            return Err(Error::InvalidConfiguration(
                "at least one log file is required".to_string(),
            ));
        }
        TimestampFormat::parse(&self.timestamp_format)?;
        Ok(())
    }

    /// Marker decoration settings for the engine.
    pub fn emit_options(&self) -> EmitOptions {
        EmitOptions {
            marker: self.marker,
            delimiter: self.delimiter.clone(),
        }
    }
}

fn parse_bool(key: &str, val: &str) -> Result<bool> {
    val.parse()
        .map_err(|_| Error::InvalidConfiguration(format!("{} must be true or false", key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = MergeConfig::default();
        assert!(config.log_files.is_empty());
        assert_eq!(config.timestamp_format, "yyyy-MM-dd HH:mm:ss");
        assert!(!config.marker);
        assert_eq!(config.delimiter, " ");
        assert_eq!(config.marker_label, MarkerLabel::Index);
        assert!(config.output_file.is_none());
        assert!(!config.gzipped_output);
        assert_eq!(config.encoding, Encoding::Utf8Lossy);
    }

    #[test]
    fn test_config_from_toml() {
        let config = MergeConfig::from_toml_str(
            r#"
log_files = ["a.log", "b.log.gz"]
timestamp_format = "%Y-%m-%dT%H:%M:%S"
marker = true
delimiter = " | "
marker_label = "file-name"
output_file = "merged.log.gz"
gzipped_output = true
encoding = "utf8_strict"
"#,
        )
        .unwrap();
        assert_eq!(config.log_files, vec![PathBuf::from("a.log"), PathBuf::from("b.log.gz")]);
        assert_eq!(config.timestamp_format, "%Y-%m-%dT%H:%M:%S");
        assert!(config.marker);
        assert_eq!(config.delimiter, " | ");
        assert_eq!(config.marker_label, MarkerLabel::FileName);
        assert_eq!(config.output_file, Some(PathBuf::from("merged.log.gz")));
        assert!(config.gzipped_output);
        assert_eq!(config.encoding, Encoding::Utf8Strict);
    }

    #[test]
    fn test_config_partial_toml_uses_defaults() {
        let config = MergeConfig::from_toml_str("marker = true\n").unwrap();
        assert!(config.marker);
        assert_eq!(config.delimiter, " ");
        assert_eq!(config.timestamp_format, "yyyy-MM-dd HH:mm:ss");
    }

    #[test]
    fn test_config_invalid_toml() {
        let err = MergeConfig::from_toml_str("marker = \"maybe\"").unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn test_config_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("logmerge.toml");
        std::fs::write(&path, "log_files = [\"x.log\"]\ndelimiter = \"\\t\"\n").unwrap();
        let mut config = MergeConfig::from_toml_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        config.apply_overrides_from(lookup_from(&[])).unwrap();
        assert_eq!(config.log_files, vec![PathBuf::from("x.log")]);
        assert_eq!(config.delimiter, "\t");
    }

    #[test]
    fn test_config_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = MergeConfig::load(Some(&temp_dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = MergeConfig::default();
        config
            .apply_overrides_from(lookup_from(&[
                ("LOGMERGE_TIMESTAMP_FORMAT", "HH:mm:ss"),
                ("LOGMERGE_DELIMITER", ": "),
                ("LOGMERGE_MARKER", "true"),
                ("LOGMERGE_MARKER_LABEL", "path"),
                ("LOGMERGE_GZIPPED_OUTPUT", "true"),
                ("LOGMERGE_STRICT_UTF8", "true"),
            ]))
            .unwrap();
        assert_eq!(config.timestamp_format, "HH:mm:ss");
        assert_eq!(config.delimiter, ": ");
        assert!(config.marker);
        assert_eq!(config.marker_label, MarkerLabel::Path);
        assert!(config.gzipped_output);
        assert_eq!(config.encoding, Encoding::Utf8Strict);
    }

    #[test]
    fn test_env_override_invalid_bool() {
        let mut config = MergeConfig::default();
        let err = config
            .apply_overrides_from(lookup_from(&[("LOGMERGE_MARKER", "yes please")]))
            .unwrap_err();
        assert!(err.to_string().contains("LOGMERGE_MARKER"));
    }

    #[test]
    fn test_env_override_invalid_marker_label() {
        let mut config = MergeConfig::default();
        let err = config
            .apply_overrides_from(lookup_from(&[("LOGMERGE_MARKER_LABEL", "color")]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn test_validate_rejects_empty_inputs() {
        let err = MergeConfig::default().validate().unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn test_validate_rejects_bad_format() {
        let config = MergeConfig {
            log_files: vec![PathBuf::from("a.log")],
            timestamp_format: "yyyy-QQ".to_string(),
            ..MergeConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_marker_labels() {
        let path = Path::new("/var/log/app/server.log");
        assert_eq!(MarkerLabel::Index.label_for(3, path), "3");
        assert_eq!(MarkerLabel::FileName.label_for(3, path), "server.log");
        assert_eq!(MarkerLabel::Path.label_for(3, path), "/var/log/app/server.log");
    }
}
