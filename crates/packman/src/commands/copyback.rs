//! Copy-back command
//!
//! Moves edits made to a staged export back into the package's cache entry,
//! where they can be committed.

use crate::fsutil;
use crate::manifest::Manifest;
use crate::path::{PathError, ProjectLayout};
use crate::reference::{PackageRef, ReferenceError};
use crate::stage::{resolve_export_path, resolve_stage_path};
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

/// Errors shared by commands that act on one installed package
#[derive(Debug, Error)]
pub enum PackageError {
    /// Invalid reference
    #[error("Invalid reference: {0}")]
    InvalidReference(#[from] ReferenceError),

    /// No readable manifest in the cache entry
    #[error("{0} is not installed")]
    NotInstalled(String),

    /// Cached manifest declares no export
    #[error("{0} does not export anything")]
    NoExport(String),

    /// Export or stage path is unusable
    #[error("Path error: {0}")]
    PathError(#[from] PathError),

    /// `unity` is not configured
    #[error("Unity executable is not configured. Run `packman config unity <path>`.")]
    UnityNotSet,

    /// Copy or spawn failed
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Cached package with its manifest and export directory
pub(crate) struct InstalledPackage {
    pub pkg: PackageRef,
    pub cache_dir: PathBuf,
    pub manifest: Manifest,
    pub export: String,
}

impl InstalledPackage {
    pub(crate) fn find(layout: &ProjectLayout, raw: &str) -> Result<Self, PackageError> {
        let pkg = PackageRef::parse(raw)?;
        let cache_dir = layout.cache_dir(pkg.name());
        let manifest = Manifest::read(&cache_dir)
            .ok_or_else(|| PackageError::NotInstalled(pkg.name().to_string()))?;
        let export = manifest
            .export_dir()
            .ok_or_else(|| PackageError::NoExport(pkg.name().to_string()))?
            .to_string();

        Ok(Self {
            pkg,
            cache_dir,
            manifest,
            export,
        })
    }
}

/// Replace the cached export of `raw` with its staged contents
///
/// Returns the export directory that was rewritten.
pub fn copy_back(layout: &ProjectLayout, raw: &str) -> Result<PathBuf, PackageError> {
    let installed = InstalledPackage::find(layout, raw)?;
    let export_path = resolve_export_path(layout, &installed.pkg, &installed.export)?;
    let stage_path = resolve_stage_path(layout, &installed.pkg, &installed.manifest)?;

    if !stage_path.exists() {
        return Err(PathError::PathNotFound(stage_path).into());
    }
    if !stage_path.is_dir() {
        return Err(PathError::NotADirectory(stage_path).into());
    }

    info!(
        "copying {} back into {}",
        stage_path.display(),
        export_path.display()
    );
    fsutil::replace_dir(&stage_path, &export_path)?;
    Ok(export_path)
}
