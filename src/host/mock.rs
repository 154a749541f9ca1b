use crate::domain::Changelog;
use crate::error::{GitflowError, Result};
use crate::host::{
    ChangelogRequest, ChangelogService, CompareStatus, Comparison, NewPullRequest, NewRelease,
    PullRequest, PullRequestRef, Release, SourceHost,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

const FIRST_PULL_NUMBER: u64 = 100;

#[derive(Default)]
struct State {
    branches: HashMap<String, String>,
    latest_release: Option<Release>,
    pull_requests: HashMap<u64, PullRequest>,
    comparisons: HashMap<(String, String), Comparison>,
    comments: HashMap<u64, Vec<String>>,
    labels: HashMap<u64, Vec<String>>,
    created_branches: Vec<(String, String)>,
    created_pull_requests: Vec<NewPullRequest>,
    releases: Vec<NewRelease>,
    merges: Vec<(String, String)>,
    next_pull_number: u64,
    fail_merges: bool,
    fail_pull_request_creation: bool,
    fail_comment_listing: bool,
}

/// In-memory host that records every mutation instead of calling a remote service
pub struct MockHost {
    state: Mutex<State>,
}

impl MockHost {
    /// Create a new empty mock host
    pub fn new() -> Self {
        MockHost {
            state: Mutex::new(State {
                next_pull_number: FIRST_PULL_NUMBER,
                ..State::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set a branch tip
    pub fn with_branch(self, branch: impl Into<String>, sha: impl Into<String>) -> Self {
        self.state().branches.insert(branch.into(), sha.into());
        self
    }

    /// Set the latest published release
    pub fn with_latest_release(self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        self.state().latest_release = Some(Release {
            html_url: format!("https://example.test/releases/tag/{}", tag),
            name: Some(tag.clone()),
            tag_name: tag,
            body: None,
        });
        self
    }

    /// Register an existing pull request
    pub fn with_pull_request(self, pull_request: PullRequest) -> Self {
        self.state()
            .pull_requests
            .insert(pull_request.number, pull_request);
        self
    }

    /// Register an existing comment on a pull request
    pub fn with_comment(self, number: u64, body: impl Into<String>) -> Self {
        self.state()
            .comments
            .entry(number)
            .or_default()
            .push(body.into());
        self
    }

    /// Fix the result of comparing `base...head`
    ///
    /// Unregistered comparisons report `head` one commit ahead.
    pub fn with_comparison(
        self,
        base: impl Into<String>,
        head: impl Into<String>,
        comparison: Comparison,
    ) -> Self {
        self.state()
            .comparisons
            .insert((base.into(), head.into()), comparison);
        self
    }

    /// Make every direct merge fail as a conflict
    pub fn fail_merges(self) -> Self {
        self.state().fail_merges = true;
        self
    }

    /// Make every pull request creation fail
    pub fn fail_pull_request_creation(self) -> Self {
        self.state().fail_pull_request_creation = true;
        self
    }

    /// Make comment listing fail
    pub fn fail_comment_listing(self) -> Self {
        self.state().fail_comment_listing = true;
        self
    }

    /// Branches created as `(name, sha)`
    pub fn created_branches(&self) -> Vec<(String, String)> {
        self.state().created_branches.clone()
    }

    pub fn created_pull_requests(&self) -> Vec<NewPullRequest> {
        self.state().created_pull_requests.clone()
    }

    pub fn comments(&self, number: u64) -> Vec<String> {
        self.state()
            .comments
            .get(&number)
            .cloned()
            .unwrap_or_default()
    }

    pub fn labels(&self, number: u64) -> Vec<String> {
        self.state()
            .labels
            .get(&number)
            .cloned()
            .unwrap_or_default()
    }

    pub fn releases(&self) -> Vec<NewRelease> {
        self.state().releases.clone()
    }

    /// Successful merges as `(base, head)`
    pub fn merges(&self) -> Vec<(String, String)> {
        self.state().merges.clone()
    }

    /// Total number of remote mutations performed
    pub fn mutation_count(&self) -> usize {
        let state = self.state();
        state.created_branches.len()
            + state.created_pull_requests.len()
            + state.releases.len()
            + state.merges.len()
            + state.labels.values().map(Vec::len).sum::<usize>()
            + state.comments.values().map(Vec::len).sum::<usize>()
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceHost for MockHost {
    async fn branch_sha(&self, branch: &str) -> Result<String> {
        self.state()
            .branches
            .get(branch)
            .cloned()
            .ok_or_else(|| GitflowError::NotFound(format!("Branch not found: {}", branch)))
    }

    async fn latest_release(&self) -> Result<Option<Release>> {
        Ok(self.state().latest_release.clone())
    }

    async fn create_branch(&self, branch: &str, sha: &str) -> Result<()> {
        let mut state = self.state();
        if state.branches.contains_key(branch) {
            return Err(GitflowError::api(422, "Reference already exists"));
        }
        state.branches.insert(branch.to_string(), sha.to_string());
        state
            .created_branches
            .push((branch.to_string(), sha.to_string()));
        Ok(())
    }

    async fn get_pull_request(&self, number: u64) -> Result<PullRequest> {
        self.state()
            .pull_requests
            .get(&number)
            .cloned()
            .ok_or_else(|| GitflowError::NotFound(format!("Pull request #{}", number)))
    }

    async fn create_pull_request(&self, request: &NewPullRequest) -> Result<PullRequestRef> {
        let mut state = self.state();
        if state.fail_pull_request_creation {
            return Err(GitflowError::api(
                422,
                format!("A pull request already exists for {}", request.head),
            ));
        }

        let number = state.next_pull_number;
        state.next_pull_number += 1;
        state.created_pull_requests.push(request.clone());
        state.pull_requests.insert(
            number,
            PullRequest {
                number,
                base: request.base.clone(),
                head: request.head.clone(),
                merged: false,
                merged_at: None,
                body: Some(request.body.clone()),
            },
        );

        Ok(PullRequestRef {
            number,
            html_url: format!("https://example.test/pull/{}", number),
        })
    }

    async fn add_labels(&self, number: u64, labels: &[&str]) -> Result<()> {
        let mut state = self.state();
        let entry = state.labels.entry(number).or_default();
        for label in labels {
            if !entry.iter().any(|l| l == label) {
                entry.push(label.to_string());
            }
        }
        Ok(())
    }

    async fn list_comments(&self, number: u64) -> Result<Vec<String>> {
        let state = self.state();
        if state.fail_comment_listing {
            return Err(GitflowError::api(502, "Bad Gateway"));
        }
        Ok(state.comments.get(&number).cloned().unwrap_or_default())
    }

    async fn create_comment(&self, number: u64, body: &str) -> Result<()> {
        self.state()
            .comments
            .entry(number)
            .or_default()
            .push(body.to_string());
        Ok(())
    }

    async fn compare(&self, base: &str, head: &str) -> Result<Comparison> {
        let key = (base.to_string(), head.to_string());
        Ok(self
            .state()
            .comparisons
            .get(&key)
            .copied()
            .unwrap_or(Comparison {
                status: CompareStatus::Ahead,
                ahead_by: 1,
                behind_by: 0,
                files_changed: 1,
            }))
    }

    async fn merge(&self, base: &str, head: &str) -> Result<()> {
        let mut state = self.state();
        if state.fail_merges {
            return Err(GitflowError::api(409, "Merge conflict"));
        }
        state.merges.push((base.to_string(), head.to_string()));
        Ok(())
    }

    async fn create_release(&self, release: &NewRelease) -> Result<Release> {
        self.state().releases.push(release.clone());
        Ok(Release {
            tag_name: release.tag_name.clone(),
            name: Some(release.name.clone()),
            html_url: format!("https://example.test/releases/tag/{}", release.tag_name),
            body: Some(release.body.clone()),
        })
    }
}

/// Changelog service returning canned notes
pub struct MockChangelog {
    changelog: Changelog,
    requests: Mutex<Vec<ChangelogRequest>>,
}

impl MockChangelog {
    pub fn new(changelog: Changelog) -> Self {
        MockChangelog {
            changelog,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<ChangelogRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ChangelogService for MockChangelog {
    async fn generate(&self, request: &ChangelogRequest) -> Result<Changelog> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        Ok(self.changelog.clone())
    }
}
