//! Package manifest handling (packman.json)
//!
//! Every package, and the host project itself, carries a `packman.json`
//! describing its name, the subtree it exports and the references it depends on.

use crate::reference::{identity, ReferenceError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the manifest inside a package or project directory
pub const MANIFEST_FILE: &str = "packman.json";

/// Errors that can occur when a manifest is required
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Failed to read or write manifest file
    #[error("Failed to access manifest file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse or serialize JSON
    #[error("Failed to parse manifest: {0}")]
    ParseError(#[from] serde_json::Error),

    /// A dependency entry is not a valid reference
    #[error("Invalid dependency: {0}")]
    InvalidReference(#[from] ReferenceError),
}

/// Package manifest (packman.json)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    /// Package name
    #[serde(default)]
    pub name: String,

    /// Subtree (relative to the package root) published to the stage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<String>,

    /// Runtime dependencies as raw reference strings
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Staging path override, relative to the project's asset root
    #[serde(default, rename = "stageTo", skip_serializing_if = "Option::is_none")]
    pub stage_to: Option<String>,

    /// Development-only dependencies
    #[serde(
        default,
        rename = "devDependencies",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub dev_dependencies: Vec<String>,

    /// Keys this tool does not interpret, kept so rewrites never drop them
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Manifest {
    /// Create a manifest with only a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Path of the manifest file inside `dir`
    pub fn path(dir: &Path) -> PathBuf {
        dir.join(MANIFEST_FILE)
    }

    /// Read the manifest in `dir`
    ///
    /// A missing or unparsable file is reported as `None`; traversal treats
    /// "no manifest" as an ordinary outcome.
    pub fn read(dir: &Path) -> Option<Self> {
        Self::load(dir).ok()
    }

    /// Read the manifest in `dir`, reporting why it could not be read
    pub fn load(dir: &Path) -> Result<Self, ManifestError> {
        let path = Self::path(dir);
        let content = std::fs::read_to_string(&path)
            .map_err(|source| ManifestError::IoError { path, source })?;
        Self::from_str(&content)
    }

    /// Parse a manifest from a string
    pub fn from_str(content: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Serialize with 2-space indentation and a trailing newline
    ///
    /// Equal manifests always serialize to identical bytes.
    pub fn to_json(&self) -> Result<String, ManifestError> {
        let mut content = serde_json::to_string_pretty(self)?;
        content.push('\n');
        Ok(content)
    }

    /// Write the manifest into `dir`
    pub fn write(&self, dir: &Path) -> Result<(), ManifestError> {
        let path = Self::path(dir);
        let content = self.to_json()?;
        std::fs::write(&path, content).map_err(|source| ManifestError::IoError { path, source })
    }

    /// Whether this manifest publishes anything to the stage
    pub fn export_dir(&self) -> Option<&str> {
        self.export.as_deref().filter(|e| !e.is_empty())
    }

    /// Runtime and dev dependencies, runtime first
    pub fn all_dependencies(&self) -> Vec<String> {
        self.dependencies
            .iter()
            .chain(self.dev_dependencies.iter())
            .cloned()
            .collect()
    }
}

/// Drop duplicate references, keeping the rightmost occurrence per identity
///
/// Survivors keep their original relative order.
pub fn dedupe(refs: &[String]) -> Result<Vec<String>, ReferenceError> {
    let mut seen = HashSet::new();
    let mut result = Vec::with_capacity(refs.len());

    for raw in refs.iter().rev() {
        if seen.insert(identity(raw)?) {
            result.push(raw.clone());
        }
    }

    result.reverse();
    Ok(result)
}

/// Drop every reference whose identity matches one of `targets`
///
/// Qualifiers are ignored on both sides, so `a/b` removes `a/b?tag=v1`.
pub fn remove(refs: &[String], targets: &[String]) -> Result<Vec<String>, ReferenceError> {
    let names = to_names(targets)?;
    let mut result = Vec::with_capacity(refs.len());

    for raw in refs {
        if !names.contains(&identity(raw)?) {
            result.push(raw.clone());
        }
    }

    Ok(result)
}

/// Identities of a list of references
pub fn to_names(refs: &[String]) -> Result<HashSet<String>, ReferenceError> {
    refs.iter().map(|raw| identity(raw)).collect()
}

/// Dedupe and sort lexicographically, the normal form of a stored dependency list
pub fn normalize(refs: &[String]) -> Result<Vec<String>, ReferenceError> {
    let mut result = dedupe(refs)?;
    result.sort();
    Ok(result)
}
