//! Configuration management.
//!
//! Optional settings are read from `~/.config/laterpress/config.toml` (or the
//! path given with `--config`). A missing file means defaults; missing fields
//! fall back to their defaults as well. Command-line flags win over the file.

pub mod run;

pub use run::RunConfig;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::sanitizer::SanitizerConfig;

pub const DEFAULT_MAX_ITEMS: usize = 10;
pub const DEFAULT_WORKERS: usize = 4;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_DEADLINE_SECS: u64 = 120;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub sanitizer: SanitizerConfig,
    pub book: BookConfig,
}

/// HTTP and scheduling settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub max_items: usize,
    pub workers: usize,
    pub timeout_secs: u64,
    pub deadline_secs: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_items: DEFAULT_MAX_ITEMS,
            workers: DEFAULT_WORKERS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            deadline_secs: DEFAULT_DEADLINE_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Book metadata defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    pub language: String,
    /// Title override; the dated default is used when unset.
    pub title: Option<String>,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            title: None,
        }
    }
}

impl Config {
    /// Load from `path`, or from the default location when `path` is `None`.
    ///
    /// An explicit path must exist. The default path, and the config
    /// directory itself, are optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let Ok(default_path) = Self::default_config_path() else {
                    return Ok(Self::default());
                };
                if default_path.exists() {
                    Self::load_from(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/laterpress/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("laterpress").join("config.toml"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
