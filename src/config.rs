//! reeldb configuration
//!
//! A JSON file with serde defaults, validated once after loading:
//!
//! ```json
//! { "data_file": "catalog.json", "default_page_size": 20, "max_page_size": 2000, "log_level": "INFO" }
//! ```
//!
//! Only `data_file` is required.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::Severity;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Read(_) => "REEL_CONFIG_READ",
            ConfigError::Parse(_) => "REEL_CONFIG_PARSE",
            ConfigError::Invalid(_) => "REEL_CONFIG_INVALID",
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReelConfig {
    /// Dataset file (required)
    pub data_file: PathBuf,

    /// Page size when a request names none
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Larger page requests are clamped to this
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_page_size() -> usize {
    20
}
fn default_max_page_size() -> usize {
    2000
}
fn default_log_level() -> String {
    "INFO".to_string()
}

impl ReelConfig {
    /// Config with defaults for everything but the dataset
    pub fn new(data_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            log_level: default_log_level(),
        }
    }

    /// Load and validate configuration from file.
    ///
    /// A relative `data_file` is resolved against the config file's directory.
    /// Nothing is logged here; the caller applies `log_level` first.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        let mut config = Self::from_json(&content)?;

        if config.data_file.is_relative() {
            if let Some(dir) = path.parent() {
                config.data_file = dir.join(&config.data_file);
            }
        }
        Ok(config)
    }

    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: ReelConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.data_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("data_file must not be empty".into()));
        }

        if self.default_page_size == 0 {
            return Err(ConfigError::Invalid("default_page_size must be > 0".into()));
        }

        if self.max_page_size == 0 {
            return Err(ConfigError::Invalid("max_page_size must be > 0".into()));
        }

        if self.default_page_size > self.max_page_size {
            return Err(ConfigError::Invalid(format!(
                "default_page_size {} exceeds max_page_size {}",
                self.default_page_size, self.max_page_size
            )));
        }

        self.log_severity()?;
        Ok(())
    }

    pub fn log_severity(&self) -> ConfigResult<Severity> {
        self.log_level
            .parse()
            .map_err(|e: String| ConfigError::Invalid(format!("log_level: {}", e)))
    }
}
