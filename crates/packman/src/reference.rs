//! Package reference parsing
//!
//! A reference is the short string stored in `packman.json` that points at a
//! git repository:
//!
//! ```text
//! reference := owner "/" repo [ "?" qualifier ]
//! qualifier := "commit=" ALNUM+ | "branch=" value | "tag=" value
//! ```
//!
//! Owners are ASCII letters, digits, `-` and `_`. Repos may also contain
//! `.` but are never `.` or `..`. Keeping dots out of owners makes the
//! `owner.repo` identity unambiguous. At most one qualifier may be given; a
//! qualifier region naming more than one of `commit=`, `branch=`, `tag=` is
//! rejected instead of guessing a precedence.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use url::Url;

/// Host that `owner/repo` is resolved against when no other host is configured
pub const DEFAULT_GIT_HOST: &str = "https://github.com/";

/// Owner name reserved for packages copied from a local directory
pub const LOCAL_OWNER: &str = "local";

const QUALIFIER_KEYS: [&str; 3] = ["commit=", "branch=", "tag="];

/// Errors that can occur while parsing a reference string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    /// Empty or whitespace-only input
    #[error("Empty package reference")]
    Empty,

    /// Input does not match `owner/repo[?qualifier]`
    #[error("Reference has wrong format: '{0}' (expected owner/repo[?commit=<id>|?branch=<name>|?tag=<name>])")]
    Malformed(String),

    /// Qualifier key without a value
    #[error("Empty value for '{qualifier}' in '{reference}'")]
    EmptyQualifier {
        reference: String,
        qualifier: &'static str,
    },

    /// Qualifier key other than commit, branch or tag
    #[error("Unknown qualifier '{qualifier}' in '{reference}'")]
    UnknownQualifier { reference: String, qualifier: String },

    /// More than one of commit, branch, tag
    #[error("Ambiguous qualifiers in '{0}': only one of commit, branch or tag may be given")]
    AmbiguousQualifier(String),

    /// Commit id with non-alphanumeric characters
    #[error("Invalid commit id '{commit}' in '{reference}'")]
    InvalidCommit { reference: String, commit: String },
}

/// Version pin carried by a reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pin {
    Commit(String),
    Branch(String),
    Tag(String),
}

impl Pin {
    fn key(&self) -> &'static str {
        match self {
            Pin::Commit(_) => "commit",
            Pin::Branch(_) => "branch",
            Pin::Tag(_) => "tag",
        }
    }

    /// Commit id, branch name or tag name
    pub fn value(&self) -> &str {
        match self {
            Pin::Commit(v) | Pin::Branch(v) | Pin::Tag(v) => v,
        }
    }
}

/// Parsed identity of one reference string
///
/// Parsing is pure: the same raw string always yields an equal `PackageRef`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRef {
    raw: String,
    owner: String,
    repo: String,
    name: String,
    url: Url,
    pin: Option<Pin>,
}

impl PackageRef {
    /// Parse a reference string
    pub fn parse(raw: &str) -> Result<Self, ReferenceError> {
        if raw.trim().is_empty() {
            return Err(ReferenceError::Empty);
        }

        let (path, qualifier) = match raw.split_once('?') {
            Some((path, qualifier)) => (path, Some(qualifier)),
            None => (raw, None),
        };

        let (owner, repo) = path
            .split_once('/')
            .ok_or_else(|| ReferenceError::Malformed(raw.to_string()))?;
        if !is_owner(owner) || !is_repo(repo) {
            return Err(ReferenceError::Malformed(raw.to_string()));
        }

        let pin = match qualifier {
            Some(q) => Some(parse_qualifier(raw, q)?),
            None => None,
        };

        let url = Url::parse(DEFAULT_GIT_HOST)
            .and_then(|host| host.join(&format!("./{}/{}.git", owner, repo)))
            .map_err(|_| ReferenceError::Malformed(raw.to_string()))?;

        Ok(Self {
            raw: raw.to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
            name: format!("{}.{}", owner, repo),
            url,
            pin,
        })
    }

    /// The string this reference was parsed from
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Stable identity (`owner.repo`) used for dedup, removal and cache keys
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `owner/repo` without any qualifier
    pub fn basename(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Canonical remote URL on the default host
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Remote URL on a different host (mirror, enterprise server, `file://` root)
    pub fn url_on(&self, host: &Url) -> Result<Url, url::ParseError> {
        host.join(&format!("./{}/{}.git", self.owner, self.repo))
    }

    pub fn pin(&self) -> Option<&Pin> {
        self.pin.as_ref()
    }

    pub fn commit(&self) -> Option<&str> {
        match &self.pin {
            Some(Pin::Commit(c)) => Some(c),
            _ => None,
        }
    }

    pub fn branch(&self) -> Option<&str> {
        match &self.pin {
            Some(Pin::Branch(b)) => Some(b),
            _ => None,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match &self.pin {
            Some(Pin::Tag(t)) => Some(t),
            _ => None,
        }
    }

    /// Symbolic ref looked up on the remote: `HEAD`, `refs/heads/<branch>` or `refs/tags/<tag>`
    ///
    /// A pinned commit has no symbolic ref of its own and reports `HEAD`.
    pub fn git_ref(&self) -> String {
        match &self.pin {
            Some(Pin::Branch(b)) => format!("refs/heads/{}", b),
            Some(Pin::Tag(t)) => format!("refs/tags/{}", t),
            Some(Pin::Commit(_)) | None => "HEAD".to_string(),
        }
    }

    /// What to check out after cloning; `None` keeps the default branch head
    pub fn checkout_target(&self) -> Option<&str> {
        self.pin.as_ref().map(Pin::value)
    }

    /// Whether this reference points at a local directory instead of a remote
    pub fn is_local(&self) -> bool {
        self.owner == LOCAL_OWNER
    }

    /// Whether a commit id reported by git satisfies this reference's pinned commit
    ///
    /// Pins of 7 or more hex digits also match as an abbreviated prefix.
    pub fn commit_matches(&self, head: &str) -> bool {
        let Some(commit) = self.commit() else {
            return false;
        };
        if commit == head {
            return true;
        }
        commit.len() >= 7
            && commit.len() <= head.len()
            && commit.bytes().all(|b| b.is_ascii_hexdigit())
            && head
                .get(..commit.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(commit))
    }

    /// Render the canonical reference string
    pub fn to_raw(&self) -> String {
        match &self.pin {
            Some(pin) => format!("{}/{}?{}={}", self.owner, self.repo, pin.key(), pin.value()),
            None => self.basename(),
        }
    }
}

impl FromStr for PackageRef {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Identity of a raw reference string
pub fn identity(raw: &str) -> Result<String, ReferenceError> {
    PackageRef::parse(raw).map(|r| r.name)
}

fn is_owner(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

fn is_repo(s: &str) -> bool {
    !s.is_empty()
        && s != "."
        && s != ".."
        && s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b'.')
}

fn parse_qualifier(raw: &str, qualifier: &str) -> Result<Pin, ReferenceError> {
    let keys: usize = QUALIFIER_KEYS
        .iter()
        .map(|key| qualifier.matches(key).count())
        .sum();
    if keys > 1 {
        return Err(ReferenceError::AmbiguousQualifier(raw.to_string()));
    }

    let (key, value) = qualifier
        .split_once('=')
        .ok_or_else(|| ReferenceError::Malformed(raw.to_string()))?;

    let kind: &'static str = match key {
        "commit" => "commit",
        "branch" => "branch",
        "tag" => "tag",
        other => {
            return Err(ReferenceError::UnknownQualifier {
                reference: raw.to_string(),
                qualifier: other.to_string(),
            })
        }
    };

    if value.is_empty() {
        return Err(ReferenceError::EmptyQualifier {
            reference: raw.to_string(),
            qualifier: kind,
        });
    }
    if value
        .chars()
        .any(|c| c.is_whitespace() || c == '?' || c == '&')
    {
        return Err(ReferenceError::Malformed(raw.to_string()));
    }

    match kind {
        "commit" => {
            if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(ReferenceError::InvalidCommit {
                    reference: raw.to_string(),
                    commit: value.to_string(),
                });
            }
            Ok(Pin::Commit(value.to_string()))
        }
        "branch" => Ok(Pin::Branch(value.to_string())),
        _ => Ok(Pin::Tag(value.to_string())),
    }
}
