//! Packman library
//!
//! Git-backed package management for Unity projects:
//! - Package references (`owner/repo?branch=...`)
//! - Package manifests (packman.json)
//! - Git access behind a swappable provider
//! - Cache freshness checks against remote heads
//! - Dependency resolution, caching and staging of exported assets
//! - Project maintenance commands

pub mod commands;
pub mod config;
pub mod freshness;
pub mod fsutil;
pub mod git;
pub mod manifest;
pub mod path;
pub mod reference;
pub mod resolver;
pub mod stage;

pub use config::{Config, ConfigError};
pub use freshness::should_update;
pub use git::{GitError, GitProvider, SystemGit};
pub use manifest::{dedupe, normalize, remove, Manifest, ManifestError};
pub use path::{find_project_root, PathError, ProjectLayout};
pub use reference::{identity, PackageRef, Pin, ReferenceError};
pub use resolver::{DependencyResolver, ResolveReport, ResolverError};
pub use stage::{resolve_export_path, resolve_stage_path};
