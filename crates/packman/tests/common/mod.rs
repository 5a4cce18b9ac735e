//! Shared fixtures: a scripted git provider and project scaffolding

#![allow(dead_code)]

use packman::fsutil::copy_dir_all;
use packman::{GitError, GitProvider, Manifest, ProjectLayout};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// File the fake writes into every clone, one `<ref> <sha>` per line
const HEADS_FILE: &str = ".fakeheads";

pub const SHA_1: &str = "1111111111111111111111111111111111111111";
pub const SHA_2: &str = "2222222222222222222222222222222222222222";
pub const SHA_3: &str = "3333333333333333333333333333333333333333";

/// Remote URL of `owner/repo` on the default host
pub fn url(basename: &str) -> String {
    format!("https://github.com/{}.git", basename)
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Default)]
pub struct Calls {
    pub remote: Vec<(String, String)>,
    pub local: Vec<(PathBuf, String)>,
    pub clone: Vec<String>,
    pub checkout: Vec<(PathBuf, String)>,
}

struct Remote {
    template: PathBuf,
    heads: BTreeMap<String, String>,
}

/// In-memory [`GitProvider`]
///
/// Each published remote is a template directory plus a table of advertised
/// refs. Cloning copies the template and records the refs in the clone so
/// that local head lookups and checkouts work on cache entries too.
#[derive(Default)]
pub struct FakeGit {
    remotes: RefCell<HashMap<String, Remote>>,
    failing_clones: RefCell<Vec<String>>,
    pub calls: RefCell<Calls>,
}

impl FakeGit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `template` at `url` with `HEAD` at `head`
    pub fn publish(&self, url: &str, template: &Path, head: &str) {
        let mut heads = BTreeMap::new();
        heads.insert("HEAD".to_string(), head.to_string());
        self.remotes.borrow_mut().insert(
            url.to_string(),
            Remote {
                template: template.to_path_buf(),
                heads,
            },
        );
    }

    /// Advertise an extra ref (`refs/heads/x`, `refs/tags/x`, `refs/tags/x^{}`) on a published remote
    pub fn advertise(&self, url: &str, git_ref: &str, sha: &str) {
        if let Some(remote) = self.remotes.borrow_mut().get_mut(url) {
            remote.heads.insert(git_ref.to_string(), sha.to_string());
        }
    }

    /// Move `HEAD` of a published remote
    pub fn push(&self, url: &str, sha: &str) {
        self.advertise(url, "HEAD", sha);
    }

    /// Make every clone of `url` fail
    pub fn fail_clone(&self, url: &str) {
        self.failing_clones.borrow_mut().push(url.to_string());
    }

    pub fn remote_calls(&self) -> usize {
        self.calls.borrow().remote.len()
    }

    pub fn clone_count(&self, url: &str) -> usize {
        self.calls.borrow().clone.iter().filter(|u| *u == url).count()
    }

    pub fn total_clones(&self) -> usize {
        self.calls.borrow().clone.len()
    }

    /// Write a heads file into an existing directory, as if it were a clone
    pub fn write_heads(dir: &Path, heads: &[(&str, &str)]) {
        let content: String = heads
            .iter()
            .map(|(git_ref, sha)| format!("{} {}\n", git_ref, sha))
            .collect();
        fs::write(dir.join(HEADS_FILE), content).unwrap();
    }

    fn read_heads(dir: &Path) -> Option<BTreeMap<String, String>> {
        let content = fs::read_to_string(dir.join(HEADS_FILE)).ok()?;
        Some(
            content
                .lines()
                .filter_map(|line| line.split_once(' '))
                .map(|(r, s)| (r.to_string(), s.to_string()))
                .collect(),
        )
    }
}

impl GitProvider for FakeGit {
    fn remote_head_commit(&self, url: &str, git_ref: &str) -> Result<String, GitError> {
        self.calls
            .borrow_mut()
            .remote
            .push((url.to_string(), git_ref.to_string()));

        let remotes = self.remotes.borrow();
        let remote = remotes.get(url).ok_or_else(|| GitError::RemoteLookup {
            url: url.to_string(),
            message: "repository not found".to_string(),
        })?;
        remote
            .heads
            .get(&format!("{}^{{}}", git_ref))
            .or_else(|| remote.heads.get(git_ref))
            .cloned()
            .ok_or_else(|| GitError::RefNotFound {
                url: url.to_string(),
                git_ref: git_ref.to_string(),
            })
    }

    fn local_head_commit(&self, path: &Path, git_ref: &str) -> Option<String> {
        self.calls
            .borrow_mut()
            .local
            .push((path.to_path_buf(), git_ref.to_string()));
        Self::read_heads(path)?.get(git_ref).cloned()
    }

    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), GitError> {
        self.calls.borrow_mut().clone.push(url.to_string());

        if self.failing_clones.borrow().iter().any(|u| u == url) {
            return Err(GitError::Clone {
                url: url.to_string(),
                message: "connection reset".to_string(),
            });
        }

        let remotes = self.remotes.borrow();
        let remote = remotes.get(url).ok_or_else(|| GitError::Clone {
            url: url.to_string(),
            message: "repository not found".to_string(),
        })?;

        packman::fsutil::empty_dir(dest)?;
        copy_dir_all(&remote.template, dest)?;
        let heads: Vec<(&str, &str)> = remote
            .heads
            .iter()
            .map(|(r, s)| (r.as_str(), s.as_str()))
            .collect();
        Self::write_heads(dest, &heads);
        Ok(())
    }

    fn checkout(&self, path: &Path, target: &str) -> Result<(), GitError> {
        self.calls
            .borrow_mut()
            .checkout
            .push((path.to_path_buf(), target.to_string()));

        let mut heads = Self::read_heads(path).unwrap_or_default();
        let sha = [
            format!("refs/heads/{}", target),
            format!("refs/tags/{}^{{}}", target),
            format!("refs/tags/{}", target),
        ]
            .iter()
            .find_map(|r| heads.get(r).cloned())
            .unwrap_or_else(|| target.to_string());
        heads.insert("HEAD".to_string(), sha);

        let pairs: Vec<(&str, &str)> = heads.iter().map(|(r, s)| (r.as_str(), s.as_str())).collect();
        Self::write_heads(path, &pairs);
        Ok(())
    }
}

/// Throwaway workspace holding a project and remote templates
pub struct Workspace {
    pub temp: TempDir,
    pub layout: ProjectLayout,
}

impl Workspace {
    /// Empty project with a top-level manifest listing `dependencies`
    pub fn new(dependencies: &[&str]) -> Self {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().join("game");
        fs::create_dir_all(&root).unwrap();

        let mut manifest = Manifest::new("game");
        manifest.dependencies = strings(dependencies);
        manifest.write(&root).unwrap();

        Self {
            temp,
            layout: ProjectLayout::new(root),
        }
    }

    /// Create a remote template for `basename` with the given manifest JSON
    ///
    /// Every template carries `Export/<repo>.txt` and `README.md`.
    pub fn template(&self, basename: &str, manifest_json: Option<&str>) -> PathBuf {
        let dir = self.temp.path().join("remotes").join(basename.replace('/', "."));
        fs::create_dir_all(dir.join("Export")).unwrap();
        let repo = basename.rsplit('/').next().unwrap_or(basename);
        fs::write(dir.join("Export").join(format!("{}.txt", repo)), repo).unwrap();
        fs::write(dir.join("README.md"), format!("# {}\n", basename)).unwrap();
        if let Some(json) = manifest_json {
            fs::write(dir.join("packman.json"), json).unwrap();
        }
        dir
    }

    /// Template exporting `Export` and depending on `deps`, published on `git`
    pub fn package(&self, git: &FakeGit, basename: &str, deps: &[&str], head: &str) -> PathBuf {
        let deps_json = deps
            .iter()
            .map(|d| format!("\"{}\"", d))
            .collect::<Vec<_>>()
            .join(", ");
        let json = format!(
            "{{ \"name\": \"{}\", \"export\": \"Export\", \"dependencies\": [{}] }}",
            basename, deps_json
        );
        let dir = self.template(basename, Some(&json));
        git.publish(&url(basename), &dir, head);
        dir
    }

    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    pub fn cache(&self, name: &str) -> PathBuf {
        self.layout.cache_dir(name)
    }

    pub fn staged(&self, name: &str) -> PathBuf {
        self.layout.stage_root().join(name)
    }

    pub fn manifest(&self) -> Manifest {
        Manifest::load(self.root()).unwrap()
    }
}
