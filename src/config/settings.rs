//! Application settings.
//!
//! Values come from an optional `rental_ledger.toml` file and are overridden by
//! the `DATABASE_URL` and `UPLOAD_DIR` environment variables (usually set through
//! `.env`, which the binary loads with `dotenvy`).

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/rental_ledger.sqlite?mode=rwc";
const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Default settings file, looked up in the working directory
pub const DEFAULT_SETTINGS_FILE: &str = "rental_ledger.toml";

/// Runtime settings for the ledger core.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// `SeaORM` connection string
    pub database_url: String,
    /// Directory holding uploaded property images
    pub upload_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
        }
    }
}

impl Settings {
    /// Builds settings from optional TOML contents, then applies overrides from `env`.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the TOML is malformed.
    pub fn from_sources<F>(toml_contents: Option<&str>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = match toml_contents {
            Some(contents) => toml::from_str(contents).map_err(|e| Error::Config {
                message: format!("Failed to parse settings: {e}"),
            })?,
            None => Self::default(),
        };

        if let Some(url) = env("DATABASE_URL").filter(|v| !v.trim().is_empty()) {
            settings.database_url = url;
        }
        if let Some(dir) = env("UPLOAD_DIR").filter(|v| !v.trim().is_empty()) {
            settings.upload_dir = PathBuf::from(dir);
        }

        Ok(settings)
    }

    /// Loads settings from `path` if it exists, with process environment overrides.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = if path.exists() {
            tracing::debug!("Loading settings from {}", path.display());
            Some(std::fs::read_to_string(path).map_err(|e| Error::Config {
                message: format!("Failed to read settings file {}: {e}", path.display()),
            })?)
        } else {
            None
        };

        Self::from_sources(contents.as_deref(), |key| std::env::var(key).ok())
    }

    /// Loads settings from the default location (`./rental_ledger.toml`).
    pub fn load_default() -> Result<Self> {
        Self::load(DEFAULT_SETTINGS_FILE)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_defaults_without_file_or_env() {
        let settings = Settings::from_sources(None, |_| None).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_parse_settings_file() {
        let toml_str = r#"
            database_url = "sqlite://ledger.sqlite"
            upload_dir = "/var/lib/ledger/images"
        "#;

        let settings = Settings::from_sources(Some(toml_str), |_| None).unwrap();
        assert_eq!(settings.database_url, "sqlite://ledger.sqlite");
        assert_eq!(settings.upload_dir, PathBuf::from("/var/lib/ledger/images"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings =
            Settings::from_sources(Some(r#"upload_dir = "images""#), |_| None).unwrap();
        assert_eq!(settings.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(settings.upload_dir, PathBuf::from("images"));
    }

    #[test]
    fn test_env_overrides_file() {
        let toml_str = r#"database_url = "sqlite://from_file.sqlite""#;
        let settings = Settings::from_sources(Some(toml_str), |key| match key {
            "DATABASE_URL" => Some("sqlite::memory:".to_string()),
            "UPLOAD_DIR" => Some(String::new()),
            _ => None,
        })
        .unwrap();

        assert_eq!(settings.database_url, "sqlite::memory:");
        // Blank overrides are ignored
        assert_eq!(settings.upload_dir, PathBuf::from(DEFAULT_UPLOAD_DIR));
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let result = Settings::from_sources(Some("database_url = "), |_| None);
        assert!(matches!(result, Err(Error::Config { message: _ })));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let settings = Settings::load("definitely/not/here.toml").unwrap();
        assert!(!settings.database_url.is_empty());
    }
}
