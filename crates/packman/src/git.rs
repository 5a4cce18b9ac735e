//! Git access
//!
//! Everything the resolver needs from version control goes through the
//! [`GitProvider`] trait: remote and local head lookup, clone and checkout.
//! [`SystemGit`] implements it by running the `git` executable.

use crate::fsutil;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while talking to git
#[derive(Debug, Error)]
pub enum GitError {
    /// The git executable could not be started
    #[error("Failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// ls-remote failed (network, authentication, unknown repository)
    #[error("Remote lookup of {url} failed: {message}")]
    RemoteLookup { url: String, message: String },

    /// The ref is not advertised by the remote
    #[error("Ref {git_ref} not found on {url}")]
    RefNotFound { url: String, git_ref: String },

    /// Clone failed
    #[error("Failed to clone {url}: {message}")]
    Clone { url: String, message: String },

    /// Checkout target could not be resolved
    #[error("Failed to check out {target} in {path}: {message}")]
    Checkout {
        path: PathBuf,
        target: String,
        message: String,
    },

    /// Preparing the clone destination failed
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Version-control operations used by the resolver
pub trait GitProvider {
    /// Commit the remote currently advertises for `git_ref`
    ///
    /// Annotated tags are peeled to the commit they point at.
    fn remote_head_commit(&self, url: &str, git_ref: &str) -> Result<String, GitError>;

    /// Commit `git_ref` points at in the working copy at `path`, peeled to a commit
    ///
    /// `None` when there is no working copy or no such ref.
    fn local_head_commit(&self, path: &Path, git_ref: &str) -> Option<String>;

    /// Full clone of `url` into `dest`, clearing `dest` first
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), GitError>;

    /// Check out a commit, branch or tag in the working copy at `path`
    fn checkout(&self, path: &Path, target: &str) -> Result<(), GitError>;
}

impl<G: GitProvider + ?Sized> GitProvider for &G {
    fn remote_head_commit(&self, url: &str, git_ref: &str) -> Result<String, GitError> {
        (**self).remote_head_commit(url, git_ref)
    }

    fn local_head_commit(&self, path: &Path, git_ref: &str) -> Option<String> {
        (**self).local_head_commit(path, git_ref)
    }

    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), GitError> {
        (**self).clone_repo(url, dest)
    }

    fn checkout(&self, path: &Path, target: &str) -> Result<(), GitError> {
        (**self).checkout(path, target)
    }
}

/// [`GitProvider`] backed by the `git` command-line tool
#[derive(Debug, Clone)]
pub struct SystemGit {
    program: PathBuf,
}

impl Default for SystemGit {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemGit {
    /// Use `git` from `PATH`
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("git"),
        }
    }

    /// Use a specific git executable
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Whether the git executable can be started
    pub fn is_available(&self) -> bool {
        self.run(&["--version"], None)
            .map(|out| out.status.success())
            .unwrap_or(false)
    }

    fn run<S: AsRef<OsStr>>(&self, args: &[S], cwd: Option<&Path>) -> Result<Output, GitError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args).env("GIT_TERMINAL_PROMPT", "0");
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }
        debug!(
            "git {}",
            args.iter()
                .map(|a| a.as_ref().to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );
        cmd.output().map_err(|source| GitError::Spawn {
            program: self.program.display().to_string(),
            source,
        })
    }
}

impl GitProvider for SystemGit {
    fn remote_head_commit(&self, url: &str, git_ref: &str) -> Result<String, GitError> {
        let peeled = format!("{}^{{}}", git_ref);
        let mut args = vec!["ls-remote", url, git_ref];
        if git_ref.starts_with("refs/tags/") {
            args.push(peeled.as_str());
        }
        let out = self.run(args.as_slice(), None)?;
        if !out.status.success() {
            return Err(GitError::RemoteLookup {
                url: url.to_string(),
                message: stderr_message(&out),
            });
        }

        let stdout = String::from_utf8_lossy(&out.stdout);
        parse_ls_remote(&stdout, git_ref).ok_or_else(|| GitError::RefNotFound {
            url: url.to_string(),
            git_ref: git_ref.to_string(),
        })
    }

    fn local_head_commit(&self, path: &Path, git_ref: &str) -> Option<String> {
        if !path.join(".git").exists() {
            return None;
        }

        let spec = format!("{}^{{commit}}", git_ref);
        let out = self
            .run(&["rev-parse", "--verify", "--quiet", spec.as_str()], Some(path))
            .ok()?;
        if !out.status.success() {
            return None;
        }

        let head = String::from_utf8_lossy(&out.stdout).trim().to_string();
        is_full_sha(&head).then_some(head)
    }

    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), GitError> {
        fsutil::empty_dir(dest)?;

        let out = self.run(
            &[OsStr::new("clone"), OsStr::new("--quiet"), OsStr::new(url), dest.as_os_str()],
            None,
        )?;
        if !out.status.success() {
            return Err(GitError::Clone {
                url: url.to_string(),
                message: stderr_message(&out),
            });
        }
        Ok(())
    }

    fn checkout(&self, path: &Path, target: &str) -> Result<(), GitError> {
        let out = self.run(&["checkout", "--quiet", target], Some(path))?;
        if !out.status.success() {
            return Err(GitError::Checkout {
                path: path.to_path_buf(),
                target: target.to_string(),
                message: stderr_message(&out),
            });
        }
        Ok(())
    }
}

/// Find the commit advertised for exactly `git_ref` in `git ls-remote` output
///
/// A peeled `<ref>^{}` line wins over the ref itself, so annotated tags
/// report their commit rather than the tag object.
pub(crate) fn parse_ls_remote(output: &str, git_ref: &str) -> Option<String> {
    let peeled = format!("{}^{{}}", git_ref);
    let lookup = |wanted: &str| {
        output.lines().find_map(|line| {
            let (sha, name) = line.split_once('\t')?;
            (name.trim() == wanted && is_full_sha(sha)).then(|| sha.to_string())
        })
    };
    lookup(&peeled).or_else(|| lookup(git_ref))
}

/// 40 hex characters
pub fn is_full_sha(s: &str) -> bool {
    s.len() == 40 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

fn stderr_message(out: &Output) -> String {
    let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
    if stderr.is_empty() {
        format!("git exited with {}", out.status)
    } else {
        stderr
    }
}
