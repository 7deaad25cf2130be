//! Configuration loading and config file resolution
//!
//! Settings sources, highest priority first:
//! 1. Command-line argument (`--config PATH`)
//! 2. Environment variable (`AUDIENCE_CONFIG`)
//! 3. User config file (`~/.config/audience/config.toml` on Linux)
//! 4. Built-in defaults
//!
//! An explicitly named file (1 or 2) must exist and parse. The user config
//! file is optional; when it is absent the defaults are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Environment variable naming a config file
pub const CONFIG_ENV_VAR: &str = "AUDIENCE_CONFIG";

/// Environment variable overriding `api.base_url`
pub const BASE_URL_ENV_VAR: &str = "AUDIENCE_API_BASE_URL";

/// Configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Discovery API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// User-list paging settings
    #[serde(default)]
    pub lists: ListsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Discovery API settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL of the discovery node, without trailing `/v1`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Sent as the `app_name` query parameter and in the User-Agent
    #[serde(default = "default_app_name")]
    pub app_name: String,
}

/// User-list paging settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListsConfig {
    /// Users requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_base_url() -> String {
    "https://discoveryprovider.audius.co".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_app_name() -> String {
    "audience".to_string()
}

fn default_page_size() -> u32 {
    15
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            app_name: default_app_name(),
        }
    }
}

impl Default for ListsConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ApiConfig {
    /// HTTP request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl TomlConfig {
    /// Parse and validate a config file
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        let config: TomlConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the list providers cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(Error::Config("api.base_url must not be empty".to_string()));
        }
        if self.api.timeout_secs == 0 {
            return Err(Error::Config("api.timeout_secs must be greater than 0".to_string()));
        }
        if self.lists.page_size == 0 {
            return Err(Error::Config("lists.page_size must be greater than 0".to_string()));
        }
        Ok(())
    }
}

/// Resolves which config file to load
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
}

impl ConfigResolver {
    /// Create a resolver; `cli_path` is the `--config` argument if given
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self { cli_path }
    }

    /// Load configuration following the priority order in the module docs,
    /// then apply the base URL environment override
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match self.explicit_path() {
            Some(path) => {
                info!("Loading config from {}", path.display());
                TomlConfig::from_path(&path)?
            }
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => {
                    info!("Loading config from {}", path.display());
                    TomlConfig::from_path(&path)?
                }
                None => {
                    debug!("No config file found, using built-in defaults");
                    TomlConfig::default()
                }
            },
        };

        if let Ok(base_url) = std::env::var(BASE_URL_ENV_VAR) {
            if base_url.trim().is_empty() {
                warn!("{} is set but empty, ignoring", BASE_URL_ENV_VAR);
            } else {
                config.api.base_url = base_url;
            }
        }

        config.validate()?;
        Ok(config)
    }

    fn explicit_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.cli_path {
            return Some(path.clone());
        }
        std::env::var(CONFIG_ENV_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
    }
}

/// Platform config file location (`<config dir>/audience/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("audience").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = TomlConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.lists.page_size, 15);
        assert_eq!(config.api.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: TomlConfig = toml::from_str("[lists]\npage_size = 50\n").unwrap();
        assert_eq!(config.lists.page_size, 50);
        assert_eq!(config.api.base_url, default_base_url());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let mut config = TomlConfig::default();
        config.lists.page_size = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
