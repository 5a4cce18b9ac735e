//! Subcommand implementations.

pub mod config;
pub mod copyback;
pub mod gitignore;
pub mod init;
pub mod install;
pub mod open;
pub mod remove;

use crate::output::StyledOutput;
use packman::{Config, ProjectLayout};
use std::path::PathBuf;

/// Everything a subcommand needs, resolved once in `main`.
pub struct Context {
    pub layout: ProjectLayout,
    pub config: Config,
    pub config_path: PathBuf,
    pub out: StyledOutput,
}
