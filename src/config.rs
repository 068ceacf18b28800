//! Configuration management for websift.
//!
//! Handles loading, saving, and validating configuration from
//! platform-specific config directories. Each backend gets its own
//! section so credentials and per-site knobs stay per-instance.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application name used for config directory.
const APP_NAME: &str = "websift";

/// Default config filename.
const CONFIG_FILENAME: &str = "config.toml";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Shared HTTP client settings.
    pub http: HttpConfig,

    /// Output shaping for the command line.
    pub output: OutputConfig,

    /// Per-backend settings.
    pub backends: BackendsConfig,
}

/// HTTP client configuration shared by all backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User agent sent with every request.
    pub user_agent: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Delay between requests to the same site, in seconds.
    pub delay_between_requests_sec: f64,

    /// Enable debug traces on stderr.
    pub debug: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: crate::browser::DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            delay_between_requests_sec: 1.0,
            debug: false,
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default maximum number of results printed per command.
    pub count: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { count: 10 }
    }
}

/// Per-backend sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendsConfig {
    pub coopanet: CredentialsConfig,
    pub kickass: SiteConfig,
    pub attilasub: SiteConfig,
    pub sevenfiftygrams: SiteConfig,
    pub lemouv: LemouvConfig,
    pub cinesift: SiteConfig,
    pub adopteunmec: CredentialsConfig,
}

/// Settings for a backend that works anonymously.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub enabled: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Settings for a backend that needs stored credentials.
///
/// Disabled by default so a fresh config works without accounts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub enabled: bool,
    pub username: String,
    pub password: String,
}

impl CredentialsConfig {
    /// Checks that both credential halves are present.
    pub fn is_configured(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

/// What a backend should do when upstream data it expected is malformed
/// or missing: substitute a placeholder, or report an extraction error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnMissing {
    Error,
    Placeholder,
}

/// Settings for the lemouv radio backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LemouvConfig {
    pub enabled: bool,

    /// Policy for malformed "now playing" feed entries.
    pub on_missing: OnMissing,

    /// Text substituted when `on_missing` is `placeholder`.
    pub placeholder: String,
}

impl Default for LemouvConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            on_missing: OnMissing::Placeholder,
            placeholder: "Not defined".to_string(),
        }
    }
}

impl Config {
    /// Returns the platform-specific config directory path.
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Returns the full path to the config file.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join(CONFIG_FILENAME))
    }

    /// Loads configuration from the default location.
    ///
    /// If the config file doesn't exist, creates a default one.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Ok(config)
    }

    /// Saves configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backends.coopanet.enabled && !self.backends.coopanet.is_configured() {
            return Err(ConfigError::MissingValue(
                "backends.coopanet.username / password".to_string(),
            ));
        }

        if self.backends.adopteunmec.enabled && !self.backends.adopteunmec.is_configured() {
            return Err(ConfigError::MissingValue(
                "backends.adopteunmec.username / password".to_string(),
            ));
        }

        if self.http.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "http.timeout_secs".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.backends.coopanet.enabled);
        assert!(config.backends.kickass.enabled);
        assert_eq!(config.backends.lemouv.on_missing, OnMissing::Placeholder);
        assert_eq!(config.output.count, 10);
        assert_eq!(config.http.timeout_secs, 30);
    }

    #[test]
    fn test_default_config_validates() {
        // Credentialed backends are disabled out of the box.
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_enabled_bank_requires_credentials() {
        let mut config = Config::default();
        config.backends.coopanet.enabled = true;
        assert!(config.validate().is_err());

        config.backends.coopanet.username = "12345678".to_string();
        config.backends.coopanet.password = "123456".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_round_trip() {
        let mut config = Config::default();
        config.backends.lemouv.on_missing = OnMissing::Error;
        config.output.count = 25;

        let file = NamedTempFile::new().unwrap();
        config.save_to(file.path()).unwrap();

        let loaded = Config::load_from(file.path()).unwrap();
        assert_eq!(loaded.backends.lemouv.on_missing, OnMissing::Error);
        assert_eq!(loaded.output.count, 25);
    }

    #[test]
    fn test_missing_file_creates_default() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.output.count, 10);
    }
}
