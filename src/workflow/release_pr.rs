use crate::config::Config;
use crate::domain::templates::release_explanation;
use crate::domain::resolve_version;
use crate::error::Result;
use crate::host::{ChangelogRequest, ChangelogService, NewPullRequest, SourceHost};
use crate::outcome::{Outcome, ReleasePrOutcome};
use tracing::{debug, info, warn};

/// Label attached to every release pull request
pub const RELEASE_LABEL: &str = "release";

/// Propose a release: cut a release branch from development and open a pull
/// request into production
///
/// Steps:
/// 1. Read the development branch tip
/// 2. Look up the latest published release
/// 3. Resolve the version
/// 4. Generate release notes since the latest release
/// 5. Unless dry-run, create the branch, the pull request, its label and
///    the explanatory comment
///
/// Failures after the branch is created are not rolled back.
pub async fn create_release_pr(
    config: &Config,
    host: &dyn SourceHost,
    changelog_service: &dyn ChangelogService,
) -> Result<Outcome> {
    let develop_sha = host.branch_sha(&config.develop_branch).await?;
    debug!(branch = %config.develop_branch, sha = %develop_sha, "resolved development tip");

    let latest_tag = host.latest_release().await?.map(|release| release.tag_name);
    match &latest_tag {
        Some(tag) => info!(tag = %tag, "latest release"),
        None => info!("no published release yet"),
    }

    let version = resolve_version(
        latest_tag.as_deref(),
        config.version.as_deref(),
        config.version_increment,
        &develop_sha,
    )?;
    let release_branch = config.branch_rules().release_branch(&version);
    info!(version = %version, branch = %release_branch, "resolved release version");

    let changelog = changelog_service
        .generate(&ChangelogRequest {
            version: version.clone(),
            target: config.develop_branch.clone(),
            since_tag: latest_tag.clone(),
        })
        .await?;
    let pull_numbers_in_release = changelog.pull_numbers();

    let pull_number = if config.dry_run {
        info!(branch = %release_branch, "dry run, skipping branch and pull request creation");
        None
    } else {
        host.create_branch(&release_branch, &develop_sha).await?;
        info!(branch = %release_branch, sha = %develop_sha, "created release branch");

        let pull_request = host
            .create_pull_request(&NewPullRequest {
                title: changelog.pull_request_title(&version),
                body: changelog.pull_request_body(&config.release_summary),
                head: release_branch.clone(),
                base: config.main_branch.clone(),
                maintainer_can_modify: false,
            })
            .await?;
        info!(
            pull_number = pull_request.number,
            url = %pull_request.html_url,
            "opened release pull request"
        );

        host.add_labels(pull_request.number, &[RELEASE_LABEL]).await?;

        let explanation = release_explanation(&config.develop_branch, &config.main_branch);
        ensure_comment(host, pull_request.number, &explanation).await?;

        Some(pull_request.number)
    };

    Ok(Outcome::ReleasePr(ReleasePrOutcome {
        pull_number,
        pull_numbers_in_release,
        version,
        release_branch,
        latest_release_tag_name: latest_tag,
    }))
}

/// Post `body` on a pull request unless an identical comment is already there
///
/// A failed lookup counts as "no comments yet".
///
/// # Returns
/// * `Ok(true)` - The comment was posted
/// * `Ok(false)` - An identical comment already existed
pub async fn ensure_comment(host: &dyn SourceHost, number: u64, body: &str) -> Result<bool> {
    let existing = match host.list_comments(number).await {
        Ok(comments) => comments,
        Err(e) => {
            warn!(pull_number = number, error = %e, "could not list comments");
            Vec::new()
        }
    };

    if existing.iter().any(|comment| comment == body) {
        debug!(pull_number = number, "comment already present");
        return Ok(false);
    }

    host.create_comment(number, body).await?;
    info!(pull_number = number, "posted comment");
    Ok(true)
}
