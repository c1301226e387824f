//! User configuration
//!
//! Read from the file given by `--config` / `CELLFORGE_CONFIG`, else
//! `./.cellforge.yaml` when present, else defaults.
//!
//! ```yaml
//! default_format: markdown
//! precision: 2
//! csv:
//!   delimiter: ";"
//!   has_header: true
//! ```

use crate::codec::{CsvOptions, Format};
use crate::error::{CellforgeError, CellforgeResult};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "CELLFORGE_CONFIG";

/// Config file picked up from the working directory
pub const LOCAL_CONFIG: &str = ".cellforge.yaml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Output format when neither `--format` nor an output extension decides
    pub default_format: Option<Format>,
    /// Decimal places for text/markdown rendering of fractional numbers
    pub precision: Option<usize>,
    pub csv: CsvConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CsvConfig {
    pub delimiter: char,
    pub has_header: bool,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            has_header: true,
        }
    }
}

impl Config {
    /// Parse YAML config text
    pub fn from_yaml(text: &str) -> CellforgeResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(text)?;
        config.csv_options()?;
        Ok(config)
    }

    /// Load config: the explicit path if given, else the local file if it
    /// exists, else defaults
    pub fn load(explicit: Option<&Path>) -> CellforgeResult<Self> {
        let path: PathBuf = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let local = PathBuf::from(LOCAL_CONFIG);
                if !local.exists() {
                    debug!("no config file, using defaults");
                    return Ok(Self::default());
                }
                local
            }
        };

        let text = fs::read_to_string(&path).map_err(|e| {
            CellforgeError::InvalidArgument(format!(
                "cannot read config {}: {}",
                path.display(),
                e
            ))
        })?;
        debug!(path = %path.display(), "loaded config");
        Self::from_yaml(&text)
    }

    /// CSV reader/writer options
    pub fn csv_options(&self) -> CellforgeResult<CsvOptions> {
        let delimiter = u8::try_from(self.csv.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                CellforgeError::InvalidArgument(format!(
                    "csv delimiter must be a single ASCII character, got '{}'",
                    self.csv.delimiter
                ))
            })?;
        Ok(CsvOptions {
            delimiter,
            has_header: self.csv.has_header,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_yaml("").unwrap();
        assert_eq!(config, Config::default());
        let csv = config.csv_options().unwrap();
        assert_eq!(csv.delimiter, b',');
        assert!(csv.has_header);
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_yaml(
            "default_format: markdown\nprecision: 2\ncsv:\n  delimiter: \";\"\n  has_header: false\n",
        )
        .unwrap();
        assert_eq!(config.default_format, Some(Format::Markdown));
        assert_eq!(config.precision, Some(2));
        assert_eq!(config.csv_options().unwrap().delimiter, b';');
        assert!(!config.csv.has_header);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(matches!(
            Config::from_yaml("colour: blue\n"),
            Err(CellforgeError::Yaml(_))
        ));
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        assert!(matches!(
            Config::from_yaml("csv:\n  delimiter: \"é\"\n"),
            Err(CellforgeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.yaml");
        std::fs::write(&path, "precision: 3\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.precision, Some(3));

        let missing = dir.path().join("nope.yaml");
        assert!(Config::load(Some(&missing)).is_err());
    }
}
