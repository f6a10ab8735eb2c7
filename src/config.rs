use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const APP_DIR: &str = ".Kyanos";
const CONFIG_FILE: &str = "config.json";
const API_KEY_ENV: &str = "KYANOS_API_KEY";
const KEY_PREFIX: &str = "sk-";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to locate the home directory")]
    NoHomeDir,

    #[error("Failed to access config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid API key")]
    InvalidKey,
}

/// Contents of `~/.Kyanos/config.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Config {
    pub fn load() -> Result<Config, ConfigError> {
        Self::load_from_path(&Self::config_path()?)
    }

    pub fn load_from_path(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source: std::io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(io_err)?;
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                        .map_err(io_err)?;
                }
            }
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents).map_err(io_err)?;

        // The file holds a credential.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(io_err)?;
        }

        info!(path = %path.display(), "Config saved");
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let dirs = BaseDirs::new().ok_or(ConfigError::NoHomeDir)?;
        Ok(dirs.home_dir().join(APP_DIR).join(CONFIG_FILE))
    }

    /// The stored key, ignoring a blank value.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }
}

/// Trims the input and checks it looks like an OpenAI key.
pub fn validate_api_key(input: &str) -> Result<String, ConfigError> {
    let key = input.trim();
    if !key.starts_with(KEY_PREFIX) {
        return Err(ConfigError::InvalidKey);
    }
    Ok(key.to_string())
}

/// Picks the key to use: a non-blank environment value first, then the file.
pub fn resolve_api_key(env_value: Option<String>, config: &Config) -> Option<String> {
    env_value
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .or_else(|| config.api_key().map(str::to_string))
}

pub fn load_api_key(config: &Config) -> Option<String> {
    resolve_api_key(std::env::var(API_KEY_ENV).ok(), config)
}

pub fn save_api_key(key: &str) -> Result<(), ConfigError> {
    save_api_key_to_path(&Config::config_path()?, key)
}

/// Replaces the key and keeps any other settings already in the file.
pub fn save_api_key_to_path(path: &Path, key: &str) -> Result<(), ConfigError> {
    let mut config = Config::load_from_path(path)?;
    config.api_key = Some(key.to_string());
    config.save_to_path(path)
}
