//! Stage path mapping
//!
//! Decides where a package's exported subtree is staged inside the host project.

use crate::manifest::Manifest;
use crate::path::{resolve_within, PathError, ProjectLayout};
use crate::reference::PackageRef;
use std::path::PathBuf;

/// Destination directory for a package's exported content
///
/// A `stageTo` override is resolved against the asset root and must stay in
/// the project; otherwise the package is staged under the default staging
/// root in a directory named after its identity.
pub fn resolve_stage_path(
    layout: &ProjectLayout,
    pkg: &PackageRef,
    manifest: &Manifest,
) -> Result<PathBuf, PathError> {
    let stage_to = match manifest.stage_to.as_deref().filter(|s| !s.is_empty()) {
        Some(stage_to) => stage_to,
        None => return Ok(layout.stage_root().join(pkg.name())),
    };

    let path = resolve_within(&layout.assets_root(), stage_to, layout.root())?;
    // staging replaces the destination wholesale
    if path == layout.root() || path == layout.assets_root() || layout.cache_root().starts_with(&path)
    {
        return Err(PathError::InvalidPath(format!(
            "stageTo '{}' would replace {}",
            stage_to,
            path.display()
        )));
    }
    Ok(path)
}

/// Source directory of a package's export inside its cache entry
pub fn resolve_export_path(
    layout: &ProjectLayout,
    pkg: &PackageRef,
    export: &str,
) -> Result<PathBuf, PathError> {
    let cache_dir = layout.cache_dir(pkg.name());
    resolve_within(&cache_dir, export, &cache_dir)
}
