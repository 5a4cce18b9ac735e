//! Open command
//!
//! Launches the configured Unity editor on a cached package so it can be
//! edited as a project of its own.

use super::copyback::{InstalledPackage, PackageError};
use crate::config::Config;
use crate::path::{PathError, ProjectLayout};
use std::process::{Command, Stdio};
use tracing::info;

/// Spawn the Unity editor on the cache entry of `raw`
///
/// The editor is detached from this process; its pid is returned.
pub fn open_package(layout: &ProjectLayout, config: &Config, raw: &str) -> Result<u32, PackageError> {
    let unity = config.unity.as_deref().ok_or(PackageError::UnityNotSet)?;
    let installed = InstalledPackage::find(layout, raw)?;
    if !installed.cache_dir.is_dir() {
        return Err(PathError::NotADirectory(installed.cache_dir).into());
    }

    info!("opening {} in {}", installed.pkg.name(), unity);
    let child = Command::new(unity)
        .arg("-projectPath")
        .arg(&installed.cache_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    Ok(child.id())
}
