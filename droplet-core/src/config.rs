//! TOML configuration for the backend, the classifier, and the water-source catalog.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::catalog::SourceCatalog;
use crate::model::{UserId, WaterSource};

const DEFAULT_ENDPOINT: &str = "https://fra.cloud.appwrite.io/v1";
const DEFAULT_REFRESH_SECS: u64 = 10;

#[derive(thiserror::Error, Debug)]
/// Errors raised while loading configuration.
pub enum ConfigError {
    /// The file could not be read.
    #[error("Cannot read config: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid TOML or misses required keys.
    #[error("Cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A water source has unusable coordinates or radius.
    #[error("Invalid water source: {0}")]
    InvalidSource(String),
    /// A setting is out of range.
    #[error("Invalid setting: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
/// Complete configuration file.
pub struct DropletConfig {
    /// Document database holding the readings.
    pub backend: BackendConfig,
    /// Photo classifier; submissions are disabled without it.
    pub classifier: Option<ClassifierConfig>,
    /// Front-end settings.
    #[serde(default)]
    pub app: AppConfig,
    /// Water-source zones; the built-in catalog is used when absent.
    pub sources: Option<Vec<WaterSource>>,
}

#[derive(Debug, Clone, Deserialize)]
/// Connection settings for the document database.
pub struct BackendConfig {
    /// REST endpoint including the API version path.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Project the database belongs to.
    pub project_id: String,
    /// Database identifier.
    pub database_id: String,
    /// Collection storing the readings.
    pub collection_id: String,
    /// Optional server API key.
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
/// Prediction endpoint settings.
pub struct ClassifierConfig {
    /// URL accepting the photo upload.
    pub endpoint: String,
}

#[derive(Debug, Clone, Deserialize)]
/// Settings for the interactive front end.
pub struct AppConfig {
    /// User the log screen and submissions act as.
    pub user_id: Option<UserId>,
    /// Seconds between automatic refreshes.
    #[serde(default = "default_refresh_secs")]
    pub refresh_interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_id: None,
            refresh_interval_secs: DEFAULT_REFRESH_SECS,
        }
    }
}

impl AppConfig {
    /// Interval between automatic refreshes.
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

impl DropletConfig {
    /// Read and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the file is unreadable, malformed, or
    /// contains invalid settings.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Parse and validate configuration text.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the text is malformed or contains
    /// invalid settings.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        if config.app.refresh_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "app.refresh_interval_secs must be at least 1".to_owned(),
            ));
        }
        config.catalog()?;
        Ok(config)
    }

    /// Water-source catalog described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSource`] for an unusable zone.
    pub fn catalog(&self) -> Result<SourceCatalog, ConfigError> {
        match &self.sources {
            Some(sources) => SourceCatalog::new(sources.clone()),
            None => Ok(SourceCatalog::default()),
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_owned()
}

const fn default_refresh_secs() -> u64 {
    DEFAULT_REFRESH_SECS
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const MINIMAL: &str = r#"
[backend]
project_id = "proj"
database_id = "db"
collection_id = "droplets"
"#;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = DropletConfig::from_toml_str(MINIMAL).expect("minimal config");
        assert_eq!(config.backend.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.app.refresh_interval(), Duration::from_secs(10));
        assert!(config.classifier.is_none(), "classifier is optional");
        assert_eq!(config.catalog().expect("catalog"), SourceCatalog::default());
    }

    #[test]
    fn sources_accept_radius_alias() {
        let raw = format!(
            r#"{MINIMAL}
[app]
user_id = "user-1"
refresh_interval_secs = 30

[classifier]
endpoint = "http://localhost:5000/predict"

[[sources]]
name = "Situ Gintung"
latitude = -6.303
longitude = 106.763
radius = 500

[[sources]]
name = "Danau Sunter"
latitude = -6.142
longitude = 106.871
radius_meters = 650
"#
        );
        let config = DropletConfig::from_toml_str(&raw).expect("full config");
        let catalog = config.catalog().expect("catalog");
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.sources().first().map(|source| source.radius_meters), Some(500.0));
        assert_eq!(config.app.user_id, Some(UserId("user-1".to_owned())));
        assert_eq!(
            config.classifier.map(|classifier| classifier.endpoint),
            Some("http://localhost:5000/predict".to_owned())
        );
    }

    #[test]
    fn zero_refresh_interval_is_rejected() {
        let raw = format!("{MINIMAL}\n[app]\nrefresh_interval_secs = 0\n");
        assert!(
            matches!(DropletConfig::from_toml_str(&raw), Err(ConfigError::Invalid(_))),
            "zero interval"
        );
    }

    #[test]
    fn invalid_source_is_rejected() {
        let raw = format!(
            "{MINIMAL}\n[[sources]]\nname = \"puddle\"\nlatitude = 0.0\nlongitude = 0.0\nradius = -1.0\n"
        );
        assert!(
            matches!(
                DropletConfig::from_toml_str(&raw),
                Err(ConfigError::InvalidSource(name)) if name == "puddle"
            ),
            "negative radius"
        );
    }

    #[test]
    fn missing_backend_is_a_parse_error() {
        assert!(
            matches!(DropletConfig::from_toml_str("[app]\n"), Err(ConfigError::Parse(_))),
            "backend section is required"
        );
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(MINIMAL.as_bytes()).expect("write config");
        let config = DropletConfig::from_file(file.path()).expect("config from file");
        assert_eq!(config.backend.collection_id, "droplets");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let result = DropletConfig::from_file(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))), "absent file");
    }
}
