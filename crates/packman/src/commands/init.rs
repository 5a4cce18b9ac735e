//! Project initialization command
//!
//! Writes a minimal packman.json named after the project directory.

use crate::manifest::{Manifest, ManifestError};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during project initialization
#[derive(Debug, Error)]
pub enum InitError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Manifest error
    #[error("Manifest error: {0}")]
    ManifestError(#[from] ManifestError),
}

/// Initialize a project in `dir`
///
/// Returns `false` and leaves the directory alone when a manifest already exists.
pub fn init_project(dir: &Path) -> Result<bool, InitError> {
    if Manifest::path(dir).exists() {
        return Ok(false);
    }

    let name = match dir.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => dir
            .canonicalize()?
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };

    std::fs::create_dir_all(dir)?;
    Manifest::new(name).write(dir)?;
    Ok(true)
}
