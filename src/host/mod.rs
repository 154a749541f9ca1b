//! Source-control host abstraction layer
//!
//! The release workflows talk to the hosting service only through the
//! [SourceHost] and [ChangelogService] traits, so they can run against the
//! real API or against an in-memory double.
//!
//! - [github::GitHubClient]: REST implementation backed by `reqwest`
//! - [mock::MockHost] / [mock::MockChangelog]: recording doubles for tests
//!
//! ```rust,ignore
//! # use gitflow_release::host::SourceHost;
//! # async fn example<H: SourceHost>(host: &H) -> gitflow_release::Result<()> {
//! let sha = host.branch_sha("develop").await?;
//! let latest = host.latest_release().await?;
//! # Ok(())
//! # }
//! ```

pub mod github;
pub mod mock;
pub mod repository;

pub use github::GitHubClient;
pub use mock::{MockChangelog, MockHost};
pub use repository::RepoSlug;

use crate::domain::Changelog;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Read-only view of a pull request
#[derive(Debug, Clone, PartialEq)]
pub struct PullRequest {
    pub number: u64,
    /// Branch the pull request merges into
    pub base: String,
    /// Branch the pull request merges from
    pub head: String,
    pub merged: bool,
    pub merged_at: Option<DateTime<Utc>>,
    pub body: Option<String>,
}

/// Parameters for opening a pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    pub title: String,
    pub body: String,
    pub head: String,
    pub base: String,
    pub maintainer_can_modify: bool,
}

/// Identity of a pull request that was just opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    pub number: u64,
    pub html_url: String,
}

/// A published release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub tag_name: String,
    pub name: Option<String>,
    pub html_url: String,
    pub body: Option<String>,
}

impl Release {
    /// Display name, falling back to the tag
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.tag_name)
    }
}

/// Parameters for creating a release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRelease {
    pub tag_name: String,
    pub target_commitish: String,
    pub name: String,
    pub body: String,
}

/// Relation of a head branch to a base branch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareStatus {
    Identical,
    Ahead,
    Behind,
    Diverged,
}

impl CompareStatus {
    pub fn parse(status: &str) -> Option<Self> {
        match status {
            "identical" => Some(CompareStatus::Identical),
            "ahead" => Some(CompareStatus::Ahead),
            "behind" => Some(CompareStatus::Behind),
            "diverged" => Some(CompareStatus::Diverged),
            _ => None,
        }
    }
}

/// Result of comparing `base...head`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comparison {
    pub status: CompareStatus,
    /// Commits on head missing from base
    pub ahead_by: u64,
    /// Commits on base missing from head
    pub behind_by: u64,
    /// Files that differ between the two tips
    pub files_changed: usize,
}

impl Comparison {
    pub fn identical() -> Self {
        Comparison {
            status: CompareStatus::Identical,
            ahead_by: 0,
            behind_by: 0,
            files_changed: 0,
        }
    }

    pub fn is_identical(&self) -> bool {
        self.status == CompareStatus::Identical
    }
}

/// Remote operations the release workflows perform on the hosting service
///
/// Every method is one remote call. Implementations map transport and
/// API failures into [crate::error::GitflowError]; a missing resource is
/// reported as `NotFound` unless the method says otherwise.
#[async_trait]
pub trait SourceHost: Send + Sync {
    /// Full commit hash at the tip of a branch
    async fn branch_sha(&self, branch: &str) -> Result<String>;

    /// Most recent published release
    ///
    /// # Returns
    /// * `Ok(None)` - The repository has no published release yet
    async fn latest_release(&self) -> Result<Option<Release>>;

    /// Create `refs/heads/<branch>` pointing at `sha`
    async fn create_branch(&self, branch: &str, sha: &str) -> Result<()>;

    async fn get_pull_request(&self, number: u64) -> Result<PullRequest>;

    async fn create_pull_request(&self, request: &NewPullRequest) -> Result<PullRequestRef>;

    /// Attach labels to a pull request, creating missing labels
    async fn add_labels(&self, number: u64, labels: &[&str]) -> Result<()>;

    /// Bodies of every comment on a pull request, oldest first
    async fn list_comments(&self, number: u64) -> Result<Vec<String>>;

    async fn create_comment(&self, number: u64, body: &str) -> Result<()>;

    /// Compare two branches as `base...head`
    async fn compare(&self, base: &str, head: &str) -> Result<Comparison>;

    /// Merge `head` into `base` directly on the host
    async fn merge(&self, base: &str, head: &str) -> Result<()>;

    async fn create_release(&self, release: &NewRelease) -> Result<Release>;
}

/// What a changelog is generated for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogRequest {
    /// Version the notes describe
    pub version: String,
    /// Branch the release is cut from
    pub target: String,
    /// Tag of the previous release; `None` covers the whole history
    pub since_tag: Option<String>,
}

/// External service turning commit history into release notes
#[async_trait]
pub trait ChangelogService: Send + Sync {
    async fn generate(&self, request: &ChangelogRequest) -> Result<Changelog>;
}
