//! Package manager commands
//!
//! Implements the commands: init, gitignore, install, remove, copyback, open, config.

pub mod config;
pub mod copyback;
pub mod gitignore;
pub mod init;
pub mod install;
pub mod open;
pub mod remove;

pub use config::{config_command, ConfigAction};
pub use copyback::{copy_back, PackageError};
pub use gitignore::update_gitignore;
pub use init::{init_project, InitError};
pub use install::{install_packages, InstallError, InstallOptions, InstallResult};
pub use open::open_package;
pub use remove::{remove_packages, RemoveError};
