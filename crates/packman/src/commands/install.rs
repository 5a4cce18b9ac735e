//! Install command
//!
//! Resolves requested references (or everything the project declares),
//! then records them in packman.json once the whole run has succeeded.

use crate::config::Config;
use crate::git::GitProvider;
use crate::manifest::{normalize, remove, Manifest, ManifestError};
use crate::path::ProjectLayout;
use crate::reference::{PackageRef, ReferenceError};
use crate::resolver::{DependencyResolver, ResolveReport, ResolverError};
use thiserror::Error;
use tracing::info;

/// Errors that can occur during installation
#[derive(Debug, Error)]
pub enum InstallError {
    /// No packman.json in the project root
    #[error("No packman.json found. Run `packman init` to create one.")]
    NoManifest,

    /// Manifest error
    #[error("Manifest error: {0}")]
    ManifestError(#[from] ManifestError),

    /// Invalid requested reference
    #[error("Invalid reference: {0}")]
    InvalidReference(#[from] ReferenceError),

    /// Resolution error
    #[error("Resolution error: {0}")]
    ResolverError(#[from] ResolverError),
}

/// Install options
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Record explicitly requested references as dev dependencies
    pub dev: bool,

    /// Leave dev dependencies out when installing everything
    pub production: bool,
}

/// Install result
#[derive(Debug, Clone)]
pub struct InstallResult {
    /// What the traversal did
    pub report: ResolveReport,

    /// Manifest as written after the run
    pub manifest: Manifest,
}

/// Install `requested` into the project, or everything it declares when empty
pub fn install_packages<G: GitProvider>(
    layout: &ProjectLayout,
    config: &Config,
    git: G,
    requested: &[String],
    options: &InstallOptions,
) -> Result<InstallResult, InstallError> {
    let mut manifest = load_project_manifest(layout)?;
    let resolver = DependencyResolver::new(layout, config, git);

    if requested.is_empty() {
        let mut all = manifest.dependencies.clone();
        if !options.production {
            all.extend(manifest.dev_dependencies.iter().cloned());
        }
        info!("installing {} declared packages", all.len());

        let report = resolver.resolve(&all, &all)?;

        let mut dependencies = manifest.dependencies.clone();
        dependencies.extend(report.discovered.iter().cloned());
        manifest.dependencies = normalize(&dependencies)?;
        manifest.dev_dependencies = normalize(&manifest.dev_dependencies)?;
        manifest.write(layout.root())?;

        return Ok(InstallResult { report, manifest });
    }

    for raw in requested {
        PackageRef::parse(raw)?;
    }

    let installed = manifest.all_dependencies();
    let report = resolver.resolve(&installed, requested)?;

    let (target, other) = if options.dev {
        (&mut manifest.dev_dependencies, &mut manifest.dependencies)
    } else {
        (&mut manifest.dependencies, &mut manifest.dev_dependencies)
    };
    let mut updated = target.clone();
    updated.extend(requested.iter().cloned());
    updated.extend(report.discovered.iter().cloned());
    *target = normalize(&updated)?;
    *other = remove(other.as_slice(), requested)?;

    manifest.write(layout.root())?;
    Ok(InstallResult { report, manifest })
}

/// Load the project's own manifest, which must exist
pub fn load_project_manifest(layout: &ProjectLayout) -> Result<Manifest, InstallError> {
    if !layout.manifest_path().is_file() {
        return Err(InstallError::NoManifest);
    }
    Ok(Manifest::load(layout.root())?)
}
