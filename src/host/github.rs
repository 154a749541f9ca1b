use crate::domain::Changelog;
use crate::error::{GitflowError, Result};
use crate::host::{
    ChangelogRequest, ChangelogService, CompareStatus, Comparison, NewPullRequest, NewRelease,
    PullRequest, PullRequestRef, Release, RepoSlug, SourceHost,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// Default REST endpoint; GitHub Enterprise passes its own via `GITHUB_API_URL`
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const COMMENTS_PER_PAGE: usize = 100;

/// GitHub REST API client bound to one repository
#[derive(Debug, Clone)]
pub struct GitHubClient {
    token: String,
    repo: RepoSlug,
    api_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct BranchResponse {
    commit: CommitRef,
}

#[derive(Deserialize)]
struct CommitRef {
    sha: String,
}

#[derive(Deserialize)]
struct ReleaseResponse {
    tag_name: String,
    name: Option<String>,
    html_url: String,
    body: Option<String>,
}

impl From<ReleaseResponse> for Release {
    fn from(r: ReleaseResponse) -> Self {
        Release {
            tag_name: r.tag_name,
            name: r.name,
            html_url: r.html_url,
            body: r.body,
        }
    }
}

#[derive(Deserialize)]
struct PullResponse {
    number: u64,
    html_url: String,
    base: BranchRef,
    head: BranchRef,
    #[serde(default)]
    merged: bool,
    merged_at: Option<DateTime<Utc>>,
    body: Option<String>,
}

#[derive(Deserialize)]
struct BranchRef {
    #[serde(rename = "ref")]
    name: String,
}

#[derive(Deserialize)]
struct CommentResponse {
    #[serde(default)]
    body: Option<String>,
}

#[derive(Deserialize)]
struct CompareResponse {
    status: String,
    #[serde(default)]
    ahead_by: u64,
    #[serde(default)]
    behind_by: u64,
    #[serde(default)]
    files: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct GeneratedNotes {
    name: Option<String>,
    body: String,
}

impl GitHubClient {
    /// Create a client for a repository
    pub fn new(token: impl Into<String>, repo: RepoSlug) -> Self {
        GitHubClient {
            token: token.into(),
            repo,
            api_url: DEFAULT_API_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Use a different API root (GitHub Enterprise Server)
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_url, self.repo.owner, self.repo.name, path
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "gitflow-release")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        debug!(status = %response.status(), url = %response.url(), "github response");

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(parse_error(response).await)
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Map a non-success response into an API error, keeping GitHub's message
async fn parse_error(response: Response) -> GitflowError {
    let status = response.status();
    let url = response.url().to_string();

    let payload = response.json::<serde_json::Value>().await.ok();
    let message = payload
        .as_ref()
        .and_then(|v| v.get("message"))
        .and_then(|m| m.as_str())
        .map(String::from)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
    let detail = payload
        .as_ref()
        .and_then(|v| v.get("errors"))
        .and_then(|e| e.get(0))
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str());

    let message = match detail {
        Some(detail) => format!("{}: {}", message, detail),
        None => message,
    };

    if status == StatusCode::NOT_FOUND {
        GitflowError::NotFound(format!("{} ({})", message, url))
    } else {
        GitflowError::api(status.as_u16(), message)
    }
}

#[async_trait]
impl SourceHost for GitHubClient {
    async fn branch_sha(&self, branch: &str) -> Result<String> {
        let url = self.repo_url(&format!("branches/{}", branch));
        let response: BranchResponse = self.send_json(self.request(Method::GET, &url)).await?;
        Ok(response.commit.sha)
    }

    async fn latest_release(&self) -> Result<Option<Release>> {
        let url = self.repo_url("releases/latest");
        match self.send_json::<ReleaseResponse>(self.request(Method::GET, &url)).await {
            Ok(release) => Ok(Some(release.into())),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_branch(&self, branch: &str, sha: &str) -> Result<()> {
        let url = self.repo_url("git/refs");
        let body = json!({ "ref": format!("refs/heads/{}", branch), "sha": sha });
        self.send(self.request(Method::POST, &url).json(&body)).await?;
        Ok(())
    }

    async fn get_pull_request(&self, number: u64) -> Result<PullRequest> {
        let url = self.repo_url(&format!("pulls/{}", number));
        let pr: PullResponse = self.send_json(self.request(Method::GET, &url)).await?;
        debug!(number = pr.number, url = %pr.html_url, "loaded pull request");

        Ok(PullRequest {
            number: pr.number,
            base: pr.base.name,
            head: pr.head.name,
            merged: pr.merged || pr.merged_at.is_some(),
            merged_at: pr.merged_at,
            body: pr.body,
        })
    }

    async fn create_pull_request(&self, request: &NewPullRequest) -> Result<PullRequestRef> {
        let url = self.repo_url("pulls");
        let body = json!({
            "title": request.title,
            "body": request.body,
            "head": request.head,
            "base": request.base,
            "maintainer_can_modify": request.maintainer_can_modify,
        });
        let pr: PullResponse = self.send_json(self.request(Method::POST, &url).json(&body)).await?;

        Ok(PullRequestRef {
            number: pr.number,
            html_url: pr.html_url,
        })
    }

    async fn add_labels(&self, number: u64, labels: &[&str]) -> Result<()> {
        let url = self.repo_url(&format!("issues/{}/labels", number));
        let body = json!({ "labels": labels });
        self.send(self.request(Method::POST, &url).json(&body)).await?;
        Ok(())
    }

    async fn list_comments(&self, number: u64) -> Result<Vec<String>> {
        let mut bodies = Vec::new();
        let mut page = 1;

        loop {
            let url = self.repo_url(&format!(
                "issues/{}/comments?per_page={}&page={}",
                number, COMMENTS_PER_PAGE, page
            ));
            let comments: Vec<CommentResponse> = self
                .send_json(self.request(Method::GET, &url))
                .await?;
            let count = comments.len();
            bodies.extend(comments.into_iter().filter_map(|c| c.body));

            if count < COMMENTS_PER_PAGE {
                break;
            }
            page += 1;
        }

        Ok(bodies)
    }

    async fn create_comment(&self, number: u64, body: &str) -> Result<()> {
        let url = self.repo_url(&format!("issues/{}/comments", number));
        self.send(self.request(Method::POST, &url).json(&json!({ "body": body }))).await?;
        Ok(())
    }

    async fn compare(&self, base: &str, head: &str) -> Result<Comparison> {
        let url = self.repo_url(&format!("compare/{}...{}", base, head));
        let response: CompareResponse = self.send_json(self.request(Method::GET, &url)).await?;

        let status = CompareStatus::parse(&response.status).ok_or_else(|| {
            GitflowError::api(200, format!("Unknown comparison status '{}'", response.status))
        })?;

        Ok(Comparison {
            status,
            ahead_by: response.ahead_by,
            behind_by: response.behind_by,
            files_changed: response.files.len(),
        })
    }

    async fn merge(&self, base: &str, head: &str) -> Result<()> {
        let url = self.repo_url("merges");
        let body = json!({ "base": base, "head": head });
        self.send(self.request(Method::POST, &url).json(&body)).await?;
        Ok(())
    }

    async fn create_release(&self, release: &NewRelease) -> Result<Release> {
        let url = self.repo_url("releases");
        let body = json!({
            "tag_name": release.tag_name,
            "target_commitish": release.target_commitish,
            "name": release.name,
            "body": release.body,
        });
        let created: ReleaseResponse = self
            .send_json(self.request(Method::POST, &url).json(&body))
            .await?;
        Ok(created.into())
    }
}

#[async_trait]
impl ChangelogService for GitHubClient {
    async fn generate(&self, request: &ChangelogRequest) -> Result<Changelog> {
        let url = self.repo_url("releases/generate-notes");
        let mut body = json!({
            "tag_name": request.version,
            "target_commitish": request.target,
        });
        if let Some(since) = &request.since_tag {
            body["previous_tag_name"] = json!(since);
        }

        let notes: GeneratedNotes = self
            .send_json(self.request(Method::POST, &url).json(&body))
            .await?;
        Ok(Changelog::new(notes.name, notes.body))
    }
}
