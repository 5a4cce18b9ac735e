//! Project layout and path resolution
//!
//! All on-disk roots used by an install are derived from the project root.
//! Paths coming from manifests (export directories, stage overrides) are
//! resolved lexically and must stay inside the root they are relative to.

use crate::manifest::MANIFEST_FILE;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Permanent cache root, one full working copy per package identity
pub const CACHE_DIR: &str = ".packman";

/// Scratch root, exists only while an install runs
pub const SCRATCH_DIR: &str = ".tmp_packman";

/// Root of the host project's assets
pub const ASSETS_DIR: &str = "Assets";

/// Default staging root, relative to the project root
pub const STAGE_DIR: &str = "Assets/Plugins/packman-pkgs";

/// Errors that can occur during path resolution
#[derive(Debug, Error)]
pub enum PathError {
    /// Path does not exist
    #[error("Path does not exist: {0}")]
    PathNotFound(PathBuf),

    /// Path is not a directory
    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Absolute path where a relative one is required
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Path leaves the directory it must stay in
    #[error("Path {path} escapes {root}")]
    Traversal { path: PathBuf, root: PathBuf },

    /// Local package could not be located
    #[error("Could not find local package '{0}'")]
    LocalNotFound(String),

    /// Local package directory holds the project's cache or scratch root
    #[error("Local package source {0} contains the project's packman directories")]
    LocalOverlapsProject(PathBuf),

    /// Qualifier on a local package reference
    #[error("Local package '{0}' cannot be pinned to a commit, branch or tag")]
    LocalPinned(String),
}

/// Filesystem roots of one host project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    /// Create a layout rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Permanent cache root
    pub fn cache_root(&self) -> PathBuf {
        self.root.join(CACHE_DIR)
    }

    /// Scratch root for in-flight clones
    pub fn scratch_root(&self) -> PathBuf {
        self.root.join(SCRATCH_DIR)
    }

    /// Root that `stageTo` overrides are resolved against
    pub fn assets_root(&self) -> PathBuf {
        self.root.join(ASSETS_DIR)
    }

    /// Default staging root
    pub fn stage_root(&self) -> PathBuf {
        self.root.join(STAGE_DIR)
    }

    /// Cache entry of one package identity
    pub fn cache_dir(&self, name: &str) -> PathBuf {
        self.cache_root().join(name)
    }

    /// Scratch entry of one package identity
    pub fn scratch_dir(&self, name: &str) -> PathBuf {
        self.scratch_root().join(name)
    }

    /// Top-level manifest path
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }
}

/// Lexically normalize a path, dropping `.` and folding `..`
pub fn normalize(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            Component::CurDir => {}
            _ => components.push(component),
        }
    }

    components.iter().collect()
}

/// Join a relative path onto `base`, refusing results outside `boundary`
pub fn resolve_within(base: &Path, relative: &str, boundary: &Path) -> Result<PathBuf, PathError> {
    let rel = Path::new(relative);
    if rel.is_absolute() {
        return Err(PathError::InvalidPath(format!(
            "{} must be relative",
            relative
        )));
    }

    let resolved = normalize(&base.join(rel));
    let boundary = normalize(boundary);
    if !resolved.starts_with(&boundary) {
        return Err(PathError::Traversal {
            path: resolved,
            root: boundary,
        });
    }

    Ok(resolved)
}

/// Find the project root by looking for packman.json upwards from `start_dir`
pub fn find_project_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir;

    loop {
        if current.join(MANIFEST_FILE).is_file() {
            return Some(current.to_path_buf());
        }

        current = current.parent()?;
    }
}
