//! Config command

use crate::config::{Config, ConfigError};
use std::path::Path;

/// What `packman config` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Every key with its value
    List(Vec<(&'static str, Option<String>)>),

    /// Value of one key
    Get(String, Option<String>),

    /// Key was set and saved
    Set(String, String),
}

/// Run `packman config [key] [value]` against the file at `path`
pub fn config_command(
    path: &Path,
    key: Option<&str>,
    value: Option<&str>,
) -> Result<ConfigAction, ConfigError> {
    let mut config = Config::load_from(path);

    match (key, value) {
        (None, _) => Ok(ConfigAction::List(config.entries())),
        (Some(key), None) => Ok(ConfigAction::Get(key.to_string(), config.get(key)?)),
        (Some(key), Some(value)) => {
            config.set(key, Some(value))?;
            config.save_to(path)?;
            Ok(ConfigAction::Set(key.to_string(), value.to_string()))
        }
    }
}
