//! Dependency resolution
//!
//! Walks the dependency graph from a set of requested references, fetching
//! every stale package once, discovering its dependencies from its manifest,
//! and replacing its cache entry and staged export.
//!
//! The walk is a worklist: a package identity is enqueued at most once per
//! run, which is what bounds the walk on cycles and diamonds.

use crate::config::{Config, ConfigError};
use crate::freshness::should_update;
use crate::fsutil;
use crate::git::{GitError, GitProvider};
use crate::manifest::{dedupe, to_names, Manifest};
use crate::path::{resolve_within, PathError, ProjectLayout};
use crate::reference::{PackageRef, ReferenceError};
use crate::stage::{resolve_export_path, resolve_stage_path};
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Errors that abort a resolution run
#[derive(Debug, Error)]
pub enum ResolverError {
    /// A requested or declared reference is malformed
    #[error("Invalid reference: {0}")]
    InvalidReference(#[from] ReferenceError),

    /// Remote lookup, clone or checkout failed
    #[error("Git error: {0}")]
    GitError(#[from] GitError),

    /// Export or stage path is unusable
    #[error("Path error: {0}")]
    PathError(#[from] PathError),

    /// Configured git host is unusable
    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),

    /// Declared export directory is missing from the package
    #[error("{package} declares export '{export}' but {path} is not a directory")]
    ExportNotFound {
        package: String,
        export: String,
        path: PathBuf,
    },

    /// Cache, stage or scratch maintenance failed
    #[error("IO error at {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of a resolution run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveReport {
    /// Every identity scheduled or completed during the run
    pub resolved: BTreeSet<String>,

    /// References discovered transitively, in discovery order
    pub discovered: Vec<String>,

    /// Identities that were cloned or copied
    pub fetched: Vec<String>,

    /// Identities whose cache entry was already current
    pub up_to_date: Vec<String>,

    /// Identities whose export was staged
    pub staged: Vec<String>,

    /// Identities fetched without a manifest
    pub missing_manifest: Vec<String>,

    /// Identities whose manifest declares no export
    pub no_export: Vec<String>,
}

/// Worklist-driven resolver over one project layout
pub struct DependencyResolver<'a, G: GitProvider> {
    layout: &'a ProjectLayout,
    config: &'a Config,
    git: G,
}

impl<'a, G: GitProvider> DependencyResolver<'a, G> {
    /// Create a resolver for a project
    pub fn new(layout: &'a ProjectLayout, config: &'a Config, git: G) -> Self {
        Self {
            layout,
            config,
            git,
        }
    }

    /// Resolve `requested`, skipping dependencies already declared in `installed`
    ///
    /// `installed` protects packages the project already lists from being
    /// treated as newly discovered; pass the requested list itself to
    /// refresh everything. All requested references are parsed before any
    /// filesystem side effect.
    pub fn resolve(
        &self,
        installed: &[String],
        requested: &[String],
    ) -> Result<ResolveReport, ResolverError> {
        let installed_names = to_names(installed)?;
        let frontier = dedupe(requested)?
            .iter()
            .map(|raw| PackageRef::parse(raw))
            .collect::<Result<Vec<_>, _>>()?;

        let cache_root = self.layout.cache_root();
        let scratch_root = self.layout.scratch_root();
        ensure_dir(&cache_root)?;
        ensure_dir(&self.layout.stage_root())?;
        fsutil::empty_dir(&scratch_root).map_err(|source| ResolverError::IoError {
            path: scratch_root.clone(),
            source,
        })?;

        let mut report = ResolveReport::default();
        let result = self.drain(frontier, &installed_names, &mut report);

        let cleanup = fsutil::remove_if_exists(&scratch_root);
        result?;
        cleanup.map_err(|source| ResolverError::IoError {
            path: scratch_root,
            source,
        })?;

        Ok(report)
    }

    fn drain(
        &self,
        mut frontier: Vec<PackageRef>,
        installed_names: &HashSet<String>,
        report: &mut ResolveReport,
    ) -> Result<(), ResolverError> {
        report.resolved = frontier.iter().map(|p| p.name().to_string()).collect();

        while let Some(pkg) = frontier.pop() {
            self.visit(&pkg, &mut frontier, installed_names, report)?;
        }

        Ok(())
    }

    fn visit(
        &self,
        pkg: &PackageRef,
        frontier: &mut Vec<PackageRef>,
        installed_names: &HashSet<String>,
        report: &mut ResolveReport,
    ) -> Result<(), ResolverError> {
        let name = pkg.name().to_string();
        let cache_dir = self.layout.cache_dir(&name);
        let remote_url = if pkg.is_local() {
            String::new()
        } else {
            self.config.remote_url(pkg)?.to_string()
        };

        if !should_update(&self.git, pkg, &remote_url, &cache_dir)? {
            info!("no need to update: {}", name);
            report.up_to_date.push(name);
            return Ok(());
        }

        let scratch = self.layout.scratch_dir(&name);
        self.fetch(pkg, &remote_url, &scratch)?;
        report.fetched.push(name.clone());

        let manifest = match Manifest::read(&scratch) {
            Some(manifest) => manifest,
            None => {
                warn!("{} has no packman file", name);
                report.missing_manifest.push(name);
                return Ok(());
            }
        };

        if !manifest.dependencies.is_empty() {
            info!("inspecting dependencies from {}", name);
        }
        for raw in &manifest.dependencies {
            let dep = PackageRef::parse(raw)?;
            if dep.name() == name
                || installed_names.contains(dep.name())
                || report.resolved.contains(dep.name())
            {
                continue;
            }

            info!("found dependency: {}", dep);
            report.resolved.insert(dep.name().to_string());
            report.discovered.push(dep.raw().to_string());
            frontier.push(dep);
        }

        // paths are checked before the cache entry is touched
        let staging = match manifest.export_dir() {
            Some(export) => {
                let scratch_export = resolve_within(&scratch, export, &scratch)?;
                if !scratch_export.is_dir() {
                    return Err(ResolverError::ExportNotFound {
                        package: name,
                        export: export.to_string(),
                        path: scratch_export,
                    });
                }
                Some((
                    resolve_export_path(self.layout, pkg, export)?,
                    resolve_stage_path(self.layout, pkg, &manifest)?,
                ))
            }
            None => None,
        };

        info!("updating cache: {}", name);
        replace(&scratch, &cache_dir)?;

        let Some((export_path, stage_path)) = staging else {
            warn!("{} has no export directory", name);
            report.no_export.push(name);
            return Ok(());
        };

        info!("copying to stage: {} -> {}", name, stage_path.display());
        replace(&export_path, &stage_path)?;

        report.staged.push(name);
        Ok(())
    }

    fn fetch(&self, pkg: &PackageRef, remote_url: &str, scratch: &Path) -> Result<(), ResolverError> {
        if pkg.is_local() {
            if pkg.pin().is_some() {
                return Err(PathError::LocalPinned(pkg.raw().to_string()).into());
            }
            let source = locate_local(self.layout, self.config, pkg)?;
            info!("copying {} from {}", pkg.name(), source.display());
            return replace(&source, scratch);
        }

        info!("cloning {}", remote_url);
        self.git.clone_repo(remote_url, scratch)?;

        if let Some(target) = pkg.checkout_target() {
            info!("checking out {} in {}", target, pkg.name());
            self.git.checkout(scratch, target)?;
        }

        Ok(())
    }
}

/// Directory a `local/<repo>` package is copied from
///
/// Searched in order: the configured local repository root, the project
/// root, then `<repo>` as given. A directory enclosing the project's cache
/// or scratch root is rejected.
pub fn locate_local(
    layout: &ProjectLayout,
    config: &Config,
    pkg: &PackageRef,
) -> Result<PathBuf, PathError> {
    let mut candidates = Vec::new();
    if let Some(local_repo) = &config.local_repo {
        candidates.push(local_repo.join(pkg.repo()));
    }
    candidates.push(layout.root().join(pkg.repo()));
    candidates.push(PathBuf::from(pkg.repo()));

    let source = candidates
        .into_iter()
        .find(|candidate| candidate.is_dir())
        .ok_or_else(|| PathError::LocalNotFound(pkg.name().to_string()))?;

    let canonical =
        |path: &Path| std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let resolved = canonical(source.as_path());
    let project = ProjectLayout::new(canonical(layout.root()));
    if project.cache_root().starts_with(&resolved) || project.scratch_root().starts_with(&resolved)
    {
        return Err(PathError::LocalOverlapsProject(source));
    }

    Ok(source)
}

fn ensure_dir(path: &Path) -> Result<(), ResolverError> {
    std::fs::create_dir_all(path).map_err(|source| ResolverError::IoError {
        path: path.to_path_buf(),
        source,
    })
}

fn replace(src: &Path, dst: &Path) -> Result<(), ResolverError> {
    fsutil::replace_dir(src, dst).map_err(|source| ResolverError::IoError {
        path: dst.to_path_buf(),
        source,
    })
}
