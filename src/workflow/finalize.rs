use crate::announce::ReleaseAnnouncer;
use crate::boundary::BoundaryWarning;
use crate::config::Config;
use crate::domain::{hotfix_version, Classification};
use crate::error::{GitflowError, Result};
use crate::host::{CompareStatus, NewRelease, PullRequest, SourceHost};
use crate::outcome::{Outcome, ReleasedOutcome};
use crate::workflow::merge::try_merge;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Ship a release after its pull request was merged into production
///
/// Creates the release object, merges the released changes back into the
/// development branch and announces the release when an announcer is given.
///
/// # Arguments
/// * `pull_number` - Number from the closed pull request event
/// * `merged` - Whether the pull request was merged rather than just closed
/// * `now` - Fallback time for hotfix versions when the merge time is unknown
///
/// # Returns
/// * `Ok(Outcome::None)` - Dry-run, closed without merge, or not a release
/// * `Err(Precondition)` - The event carries no pull request number, or the
///   pull request has no description to use as release notes
pub async fn execute_on_release(
    config: &Config,
    host: &dyn SourceHost,
    announcer: Option<&dyn ReleaseAnnouncer>,
    pull_number: Option<u64>,
    merged: bool,
    now: DateTime<Utc>,
) -> Result<Outcome> {
    if config.dry_run {
        info!("dry run, not finalizing");
        return Ok(Outcome::None);
    }
    if !merged {
        info!("pull request closed without merge");
        return Ok(Outcome::None);
    }
    let number = pull_number
        .ok_or_else(|| GitflowError::precondition("closed pull request event has no number"))?;

    let pull_request = host.get_pull_request(number).await?;
    let kind = config
        .branch_rules()
        .classify(&pull_request.base, &pull_request.head);
    info!(
        pull_number = number,
        head = %pull_request.head,
        base = %pull_request.base,
        kind = %kind,
        "classified pull request"
    );

    let version = match release_version(config, kind, &pull_request, now) {
        Some(version) => version,
        None => return Ok(Outcome::None),
    };

    let body = pull_request
        .body
        .clone()
        .filter(|body| !body.trim().is_empty())
        .ok_or_else(|| {
            GitflowError::precondition(format!("pull request #{} has no description", number))
        })?;

    let release = host
        .create_release(&NewRelease {
            tag_name: version.clone(),
            target_commitish: config.main_branch.clone(),
            name: version.clone(),
            body,
        })
        .await?;
    info!(tag = %release.tag_name, url = %release.html_url, "created release");

    let mut warnings = Vec::new();

    let merge_source = if config.merge_back_from_main {
        config.main_branch.clone()
    } else {
        let divergence = check_divergence(host, &config.main_branch, &pull_request.head).await;
        warnings.extend(divergence);
        pull_request.head.clone()
    };

    let merge = try_merge(host, &merge_source, &config.develop_branch).await?;
    warnings.extend(merge.into_warning());

    if let Some(announcer) = announcer {
        announcer.announce(&release).await?;
    }

    Ok(Outcome::Released(ReleasedOutcome {
        kind,
        version,
        release_url: release.html_url,
        warnings,
    }))
}

fn release_version(
    config: &Config,
    kind: Classification,
    pull_request: &PullRequest,
    now: DateTime<Utc>,
) -> Option<String> {
    match kind {
        Classification::Release => config
            .branch_rules()
            .version_from_release_branch(&pull_request.head)
            .map(str::to_string),
        Classification::Hotfix => Some(hotfix_version(pull_request.merged_at, now)),
        Classification::Unrelated => None,
    }
}

/// Production must not carry changes the head branch lacks, or merging the
/// head branch back would leave them out of development
async fn check_divergence(
    host: &dyn SourceHost,
    production: &str,
    head: &str,
) -> Option<BoundaryWarning> {
    let comparison = match host.compare(head, production).await {
        Ok(comparison) => comparison,
        Err(e) => {
            warn!(
                head,
                production,
                error = %e,
                "could not compare production with head branch"
            );
            return None;
        }
    };

    let production_has_extra = matches!(
        comparison.status,
        CompareStatus::Ahead | CompareStatus::Diverged
    ) && comparison.files_changed > 0;

    if !production_has_extra {
        return None;
    }

    warn!(
        head,
        production,
        files = comparison.files_changed,
        ahead_by = comparison.ahead_by,
        behind_by = comparison.behind_by,
        "production diverged from head branch"
    );
    Some(BoundaryWarning::DivergentProduction {
        production: production.to_string(),
        head: head.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Comparison, MockHost};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 8, 7, 0).unwrap()
    }

    #[tokio::test]
    async fn test_divergence_ignores_merge_commit_only() {
        let host = MockHost::new().with_comparison(
            "release/1.0.0",
            "main",
            Comparison {
                status: CompareStatus::Ahead,
                ahead_by: 1,
                behind_by: 0,
                files_changed: 0,
            },
        );
        assert!(check_divergence(&host, "main", "release/1.0.0").await.is_none());
    }

    #[tokio::test]
    async fn test_divergence_detected() {
        let host = MockHost::new().with_comparison(
            "hotfix/x",
            "main",
            Comparison {
                status: CompareStatus::Diverged,
                ahead_by: 2,
                behind_by: 1,
                files_changed: 3,
            },
        );
        assert_eq!(
            check_divergence(&host, "main", "hotfix/x").await,
            Some(BoundaryWarning::DivergentProduction {
                production: "main".to_string(),
                head: "hotfix/x".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_unmerged_close_is_noop() {
        let host = MockHost::new();
        let outcome = execute_on_release(&Config::default(), &host, None, Some(1), false, now())
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::None);
        assert_eq!(host.mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_number_is_precondition() {
        let host = MockHost::new();
        let err = execute_on_release(&Config::default(), &host, None, None, true, now())
            .await
            .unwrap_err();
        assert!(matches!(err, GitflowError::Precondition(_)));
    }
}
