//! Cache freshness
//!
//! Decides whether a cached package must be fetched again. Pinned commits are
//! answered from the local working copy alone; symbolic refs (HEAD, branches,
//! tags) cost one remote lookup each.

use crate::git::{GitError, GitProvider};
use crate::manifest::Manifest;
use crate::reference::PackageRef;
use std::path::Path;
use tracing::debug;

/// Whether the cache entry at `cache_dir` is stale for `pkg`
///
/// The commit checked out in the cache entry is what gets compared, never a
/// named ref that merely exists in the clone. Checked in order, each step
/// short-circuiting the rest:
/// 1. no manifest in the cache entry
/// 2. no checked-out commit in the cache entry
/// 3. pinned commit differs from the checked-out one (no network)
/// 4. remote commit for the ref differs from the checked-out one
///
/// Local-directory packages are always considered stale.
pub fn should_update<G: GitProvider + ?Sized>(
    git: &G,
    pkg: &PackageRef,
    remote_url: &str,
    cache_dir: &Path,
) -> Result<bool, GitError> {
    if pkg.is_local() {
        return Ok(true);
    }

    if Manifest::read(cache_dir).is_none() {
        debug!("{}: not cached", pkg.name());
        return Ok(true);
    }

    let local = match git.local_head_commit(cache_dir, "HEAD") {
        Some(commit) => commit,
        None => {
            debug!("{}: no checked-out commit", pkg.name());
            return Ok(true);
        }
    };
    debug!("{}: local: {}", pkg.name(), local);

    if let Some(commit) = pkg.commit() {
        debug!("{}: pinned: {}", pkg.name(), commit);
        return Ok(!pkg.commit_matches(&local));
    }

    let remote = git.remote_head_commit(remote_url, &pkg.git_ref())?;
    debug!("{}: remote {}: {}", pkg.name(), pkg.git_ref(), remote);
    Ok(remote != local)
}
