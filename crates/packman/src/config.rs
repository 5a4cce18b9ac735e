//! Global user configuration (~/.packman-config)
//!
//! Loaded once at startup and handed to whatever needs it; nothing reads the
//! file behind the caller's back.

use crate::reference::{PackageRef, DEFAULT_GIT_HOST};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;
use url::Url;

/// File name of the global configuration inside the home directory
pub const CONFIG_FILE: &str = ".packman-config";

/// Keys accepted by `packman config`
pub const CONFIG_KEYS: [&str; 3] = ["unity", "localRepo", "gitHost"];

/// Errors that can occur while reading or updating the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Home directory cannot be determined
    #[error("Could not determine home directory")]
    NoHomeDir,

    /// Failed to write the configuration file
    #[error("Failed to write {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Key is not one of [`CONFIG_KEYS`]
    #[error("Unknown config key '{0}' (expected one of: unity, localRepo, gitHost)")]
    UnknownKey(String),

    /// gitHost is not a URL that can be a base
    #[error("Invalid git host '{host}': {reason}")]
    InvalidHost { host: String, reason: String },
}

/// User-wide settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Unity editor executable used by `open`
    #[serde(default)]
    pub unity: Option<String>,

    /// Directory searched first for `local/<repo>` packages
    #[serde(default)]
    pub local_repo: Option<PathBuf>,

    /// Base URL `owner/repo` is resolved against
    #[serde(default)]
    pub git_host: Option<String>,
}

impl Config {
    /// `~/.packman-config`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::home_dir()
            .map(|home| home.join(CONFIG_FILE))
            .ok_or(ConfigError::NoHomeDir)
    }

    /// Load from the default location, falling back to defaults
    pub fn load() -> Self {
        match Self::default_path() {
            Ok(path) => Self::load_from(&path),
            Err(_) => Self::default(),
        }
    }

    /// Load from `path`; a missing or unreadable file yields the defaults
    pub fn load_from(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return Self::default(),
        };

        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!("ignoring unreadable config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Write to `path` with 2-space indentation
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let mut content = serde_json::to_string_pretty(self)?;
        content.push('\n');
        std::fs::write(path, content).map_err(|source| ConfigError::IoError {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Current value of a key
    pub fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(match key {
            "unity" => self.unity.clone(),
            "localRepo" => self
                .local_repo
                .as_ref()
                .map(|p| p.display().to_string()),
            "gitHost" => self.git_host.clone(),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        })
    }

    /// Set or clear a key
    pub fn set(&mut self, key: &str, value: Option<&str>) -> Result<(), ConfigError> {
        let value = value.filter(|v| !v.is_empty());
        match key {
            "unity" => self.unity = value.map(String::from),
            "localRepo" => self.local_repo = value.map(PathBuf::from),
            "gitHost" => {
                if let Some(host) = value {
                    parse_host(host)?;
                }
                self.git_host = value.map(String::from);
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    /// All keys with their values, in display order
    pub fn entries(&self) -> Vec<(&'static str, Option<String>)> {
        CONFIG_KEYS
            .iter()
            .map(|key| (*key, self.get(key).ok().flatten()))
            .collect()
    }

    /// Base URL for remote repositories
    pub fn git_host(&self) -> Result<Url, ConfigError> {
        parse_host(self.git_host.as_deref().unwrap_or(DEFAULT_GIT_HOST))
    }

    /// Remote URL of a package on the configured host
    pub fn remote_url(&self, pkg: &PackageRef) -> Result<Url, ConfigError> {
        let host = self.git_host()?;
        pkg.url_on(&host).map_err(|e| ConfigError::InvalidHost {
            host: host.to_string(),
            reason: e.to_string(),
        })
    }
}

fn parse_host(host: &str) -> Result<Url, ConfigError> {
    let normalized = if host.ends_with('/') {
        host.to_string()
    } else {
        format!("{}/", host)
    };
    let url = Url::parse(&normalized).map_err(|e| ConfigError::InvalidHost {
        host: host.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidHost {
            host: host.to_string(),
            reason: "cannot be used as a base URL".to_string(),
        });
    }
    Ok(url)
}
