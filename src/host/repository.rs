use crate::error::{GitflowError, Result};
use git2::Repository as Git2Repo;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Repository identifier on the hosting service (`owner/name`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl RepoSlug {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        RepoSlug {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Extract owner and name from a remote URL
    ///
    /// Accepts HTTPS (`https://github.com/owner/name.git`), scp-like SSH
    /// (`git@github.com:owner/name.git`) and `ssh://` URLs.
    pub fn from_remote_url(url: &str) -> Option<Self> {
        let url = url.trim().trim_end_matches('/');
        let url = url.strip_suffix(".git").unwrap_or(url);

        let path = if let Some((_, rest)) = url.split_once("://") {
            rest.split_once('/')?.1
        } else {
            url.split_once(':')?.1
        };

        let mut segments = path.rsplitn(2, '/');
        let name = segments.next()?;
        let owner = segments.next()?.rsplit('/').next()?;

        if owner.is_empty() || name.is_empty() {
            return None;
        }
        Some(RepoSlug::new(owner, name))
    }

    /// Discover the repository from the `origin` remote of a local checkout
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;
        let remote = repo
            .find_remote("origin")
            .map_err(|e| GitflowError::config(format!("Cannot find remote 'origin': {}", e)))?;
        let url = remote
            .url()
            .ok_or_else(|| GitflowError::config("Remote 'origin' has no valid URL"))?;

        RepoSlug::from_remote_url(url).ok_or_else(|| {
            GitflowError::config(format!(
                "Cannot derive repository from remote URL '{}'",
                url
            ))
        })
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoSlug {
    type Err = GitflowError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(RepoSlug::new(owner, name))
            }
            _ => Err(GitflowError::config(format!(
                "Invalid repository '{}' - expected owner/name",
                s
            ))),
        }
    }
}
