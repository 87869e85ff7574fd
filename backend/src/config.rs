//! Runtime configuration.
//!
//! Values come from an optional `appsettings.json` next to the binary, then
//! from `REPORT_*` environment variables. A missing file is not an error:
//! every key has a default.

use crate::services::renderer::SanitizePolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "appsettings.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid value for {key}: {value}")]
    Env { key: &'static str, value: String },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database_path: PathBuf,
    /// Generated PDFs land here; created on first use.
    pub output_directory: PathBuf,
    pub fonts_directory: PathBuf,
    pub font_family: String,
    pub fallback_font_family: String,
    pub host: String,
    pub port: u16,
    pub log_filter: String,
    pub sanitize: SanitizePolicy,
    /// Install the sample sales template into an empty database.
    pub seed_sample: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("reports.sqlite"),
            output_directory: PathBuf::from("./Reports"),
            fonts_directory: PathBuf::from("./fonts"),
            font_family: "Arial".to_string(),
            fallback_font_family: "LiberationSans".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8080,
            log_filter: "info".to_string(),
            sanitize: SanitizePolicy::Preserve,
            seed_sample: true,
        }
    }
}

impl Config {
    /// Loads `path` if it exists and applies environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("REPORT_DATABASE") {
            self.database_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("REPORT_OUTPUT_DIR") {
            self.output_directory = PathBuf::from(v);
        }
        if let Some(v) = lookup("REPORT_FONTS_DIR") {
            self.fonts_directory = PathBuf::from(v);
        }
        if let Some(v) = lookup("REPORT_HOST") {
            self.host = v;
        }
        if let Some(v) = lookup("REPORT_PORT") {
            self.port = v.parse().map_err(|_| ConfigError::Env {
                key: "REPORT_PORT",
                value: v.clone(),
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_file(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.output_directory, PathBuf::from("./Reports"));
        assert_eq!(config.sanitize, SanitizePolicy::Preserve);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "output_directory": "/tmp/out", "sanitize": "escape" }}"#).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.output_directory, PathBuf::from("/tmp/out"));
        assert_eq!(config.sanitize, SanitizePolicy::Escape);
        assert_eq!(config.font_family, "Arial");
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            Config::from_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn environment_overrides_file_values() {
        let env: HashMap<&str, &str> =
            HashMap::from([("REPORT_PORT", "9090"), ("REPORT_DATABASE", "other.sqlite")]);
        let mut config = Config::default();
        config
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.database_path, PathBuf::from("other.sqlite"));
    }

    #[test]
    fn bad_port_override_is_rejected() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(|k| (k == "REPORT_PORT").then(|| "eighty".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { key: "REPORT_PORT", .. }));
    }
}
