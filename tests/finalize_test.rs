// tests/finalize_test.rs
use chrono::{DateTime, TimeZone, Utc};
use gitflow_release::boundary::BoundaryWarning;
use gitflow_release::config::Config;
use gitflow_release::domain::Classification;
use gitflow_release::host::{CompareStatus, Comparison, MockHost, PullRequest};
use gitflow_release::outcome::{Outcome, ReleasedOutcome};
use gitflow_release::workflow::execute_on_release;
use gitflow_release::GitflowError;

const NOTES: &str = "## What's Changed\n* Fix login by @alice in https://github.com/o/r/pull/12";

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn merged_pr(number: u64, head: &str, base: &str) -> PullRequest {
    PullRequest {
        number,
        base: base.to_string(),
        head: head.to_string(),
        merged: true,
        merged_at: Some(Utc.with_ymd_and_hms(2024, 3, 5, 8, 7, 0).unwrap()),
        body: Some(NOTES.to_string()),
    }
}

fn released(outcome: Outcome) -> ReleasedOutcome {
    match outcome {
        Outcome::Released(released) => released,
        other => panic!("expected released outcome, got {:?}", other),
    }
}

/// Production only gained the merge commit of the head branch
fn clean_merge(head: &str) -> MockHost {
    MockHost::new().with_comparison(
        head,
        "main",
        Comparison {
            status: CompareStatus::Ahead,
            ahead_by: 1,
            behind_by: 0,
            files_changed: 0,
        },
    )
}

#[tokio::test]
async fn test_release_branch_is_published_and_merged_back() {
    let host =
        clean_merge("release/2.0.0").with_pull_request(merged_pr(8, "release/2.0.0", "main"));

    let outcome = execute_on_release(&Config::default(), &host, None, Some(8), true, now())
        .await
        .unwrap();
    let released = released(outcome);

    assert_eq!(released.kind, Classification::Release);
    assert_eq!(released.version, "2.0.0");
    assert_eq!(released.release_url, "https://example.test/releases/tag/2.0.0");
    assert!(released.warnings.is_empty());

    let releases = host.releases();
    assert_eq!(releases.len(), 1);
    assert_eq!(releases[0].tag_name, "2.0.0");
    assert_eq!(releases[0].name, "2.0.0");
    assert_eq!(releases[0].target_commitish, "main");
    assert_eq!(releases[0].body, NOTES);

    assert_eq!(
        host.merges(),
        vec![("develop".to_string(), "release/2.0.0".to_string())]
    );
}

#[tokio::test]
async fn test_merge_back_from_main() {
    let host = MockHost::new().with_pull_request(merged_pr(8, "release/2.0.0", "main"));
    let config = Config {
        merge_back_from_main: true,
        ..Config::default()
    };

    execute_on_release(&config, &host, None, Some(8), true, now())
        .await
        .unwrap();

    assert_eq!(
        host.merges(),
        vec![("develop".to_string(), "main".to_string())]
    );
}

#[tokio::test]
async fn test_hotfix_version_from_merge_time() {
    let host = clean_merge("hotfix/login").with_pull_request(merged_pr(9, "hotfix/login", "main"));

    let released = released(
        execute_on_release(&Config::default(), &host, None, Some(9), true, now())
            .await
            .unwrap(),
    );

    assert_eq!(released.kind, Classification::Hotfix);
    assert_eq!(released.version, "hotfix-202403050807");
    assert_eq!(host.releases()[0].tag_name, "hotfix-202403050807");
}

#[tokio::test]
async fn test_hotfix_without_merge_time_uses_now() {
    let mut pr = merged_pr(9, "hotfix/login", "main");
    pr.merged_at = None;
    let host = clean_merge("hotfix/login").with_pull_request(pr);

    let released = released(
        execute_on_release(&Config::default(), &host, None, Some(9), true, now())
            .await
            .unwrap(),
    );

    assert_eq!(released.version, "hotfix-202406011200");
}

#[tokio::test]
async fn test_unrelated_pull_request_is_noop() {
    let host = MockHost::new()
        .with_pull_request(merged_pr(3, "feature/search", "main"))
        .with_pull_request(merged_pr(4, "release/2.0.0", "develop"));

    for number in [3, 4] {
        let outcome =
            execute_on_release(&Config::default(), &host, None, Some(number), true, now())
                .await
                .unwrap();
        assert_eq!(outcome, Outcome::None);
    }
    assert_eq!(host.mutation_count(), 0);
}

#[tokio::test]
async fn test_dry_run_is_noop() {
    let host = MockHost::new().with_pull_request(merged_pr(8, "release/2.0.0", "main"));
    let config = Config {
        dry_run: true,
        ..Config::default()
    };

    let outcome = execute_on_release(&config, &host, None, Some(8), true, now())
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::None);
    assert_eq!(host.mutation_count(), 0);
}

#[tokio::test]
async fn test_missing_body_fails_before_release() {
    let mut pr = merged_pr(8, "release/2.0.0", "main");
    pr.body = None;
    let host = MockHost::new().with_pull_request(pr);

    let err = execute_on_release(&Config::default(), &host, None, Some(8), true, now())
        .await
        .unwrap_err();

    assert!(matches!(err, GitflowError::Precondition(_)));
    assert_eq!(host.mutation_count(), 0);
}

#[tokio::test]
async fn test_conflicting_merge_back_is_reported() {
    let host = clean_merge("release/2.0.0")
        .with_pull_request(merged_pr(8, "release/2.0.0", "main"))
        .fail_merges();

    let released = released(
        execute_on_release(&Config::default(), &host, None, Some(8), true, now())
            .await
            .unwrap(),
    );

    assert_eq!(host.releases().len(), 1);
    assert_eq!(
        released.warnings,
        vec![BoundaryWarning::MergeFellBack {
            head: "release/2.0.0".to_string(),
            base: "develop".to_string(),
            pull_number: 100,
        }]
    );
}

#[tokio::test]
async fn test_divergent_production_still_merges() {
    let host = MockHost::new()
        .with_pull_request(merged_pr(9, "hotfix/login", "main"))
        .with_comparison(
            "hotfix/login",
            "main",
            Comparison {
                status: CompareStatus::Diverged,
                ahead_by: 3,
                behind_by: 1,
                files_changed: 2,
            },
        );

    let released = released(
        execute_on_release(&Config::default(), &host, None, Some(9), true, now())
            .await
            .unwrap(),
    );

    assert_eq!(
        released.warnings,
        vec![BoundaryWarning::DivergentProduction {
            production: "main".to_string(),
            head: "hotfix/login".to_string(),
        }]
    );
    assert_eq!(host.merges().len(), 1);
}
