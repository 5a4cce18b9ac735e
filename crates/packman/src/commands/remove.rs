//! Remove command
//!
//! Drops packages from packman.json and deletes their cache entries and
//! staged exports.

use crate::fsutil;
use crate::manifest::{remove, Manifest, ManifestError};
use crate::path::{PathError, ProjectLayout};
use crate::reference::{PackageRef, ReferenceError};
use crate::stage::resolve_stage_path;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Errors that can occur when removing packages
#[derive(Debug, Error)]
pub enum RemoveError {
    /// No packman.json in the project root
    #[error("No packman.json found. Run `packman init` to create one.")]
    NoManifest,

    /// Manifest error
    #[error("Manifest error: {0}")]
    ManifestError(#[from] ManifestError),

    /// Invalid reference
    #[error("Invalid reference: {0}")]
    InvalidReference(#[from] ReferenceError),

    /// Stage override of the cached package is unusable
    #[error("Path error: {0}")]
    PathError(#[from] PathError),

    /// Deleting a directory failed
    #[error("Failed to delete {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Remove `targets` (matched by identity) from both dependency lists
///
/// Returns the identities whose files were deleted.
pub fn remove_packages(layout: &ProjectLayout, targets: &[String]) -> Result<Vec<String>, RemoveError> {
    let packages = targets
        .iter()
        .map(|raw| PackageRef::parse(raw))
        .collect::<Result<Vec<_>, _>>()?;

    if !layout.manifest_path().is_file() {
        return Err(RemoveError::NoManifest);
    }
    let mut manifest = Manifest::load(layout.root())?;
    let mut dependencies = remove(&manifest.dependencies, targets)?;
    dependencies.sort();
    let mut dev_dependencies = remove(&manifest.dev_dependencies, targets)?;
    dev_dependencies.sort();
    manifest.dependencies = dependencies;
    manifest.dev_dependencies = dev_dependencies;
    manifest.write(layout.root())?;

    let mut removed = Vec::with_capacity(packages.len());
    for pkg in &packages {
        let cache_dir = layout.cache_dir(pkg.name());
        let stage_path = match Manifest::read(&cache_dir) {
            Some(cached) => resolve_stage_path(layout, pkg, &cached)?,
            None => layout.stage_root().join(pkg.name()),
        };

        info!("removing {}", pkg.name());
        delete(&cache_dir)?;
        delete(&stage_path)?;
        removed.push(pkg.name().to_string());
    }

    Ok(removed)
}

fn delete(path: &Path) -> Result<(), RemoveError> {
    fsutil::remove_if_exists(path).map_err(|source| RemoveError::IoError {
        path: path.to_path_buf(),
        source,
    })
}
