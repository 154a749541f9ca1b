// tests/release_pr_test.rs
use gitflow_release::config::Config;
use gitflow_release::domain::templates::release_explanation;
use gitflow_release::domain::{Changelog, VersionIncrement};
use gitflow_release::host::{MockChangelog, MockHost};
use gitflow_release::outcome::{Outcome, ReleasePrOutcome};
use gitflow_release::workflow::{create_release_pr, RELEASE_LABEL};
use gitflow_release::GitflowError;

const DEVELOP_SHA: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

const NOTES: &str = "## What's Changed\n\
* Fix login by @alice in https://github.com/o/r/pull/12\n\
* Add search by @bob in https://github.com/o/r/pull/7\n\
* Follow-up for https://github.com/o/r/pull/12\n";

fn config() -> Config {
    Config {
        version_increment: Some(VersionIncrement::Minor),
        release_summary: "Ship it".to_string(),
        ..Config::default()
    }
}

fn host() -> MockHost {
    MockHost::new()
        .with_branch("develop", DEVELOP_SHA)
        .with_latest_release("1.2.0")
}

fn release_pr(outcome: Outcome) -> ReleasePrOutcome {
    match outcome {
        Outcome::ReleasePr(pr) => pr,
        other => panic!("expected release pull request outcome, got {:?}", other),
    }
}

#[tokio::test]
async fn test_dry_run_computes_without_mutating() {
    let host = host();
    let changelog = MockChangelog::new(Changelog::new(None, NOTES));
    let config = Config {
        dry_run: true,
        ..config()
    };

    let pr = release_pr(create_release_pr(&config, &host, &changelog).await.unwrap());

    assert_eq!(pr.version, "1.3.0");
    assert_eq!(pr.pull_number, None);
    assert_eq!(pr.release_branch, "release/1.3.0");
    assert_eq!(pr.latest_release_tag_name.as_deref(), Some("1.2.0"));
    assert_eq!(pr.pull_numbers_in_release, vec![7, 12]);
    assert_eq!(host.mutation_count(), 0);
}

#[tokio::test]
async fn test_opens_labelled_release_pull_request() {
    let host = host();
    let changelog = MockChangelog::new(Changelog::new(Some("Spring".to_string()), NOTES));

    let pr = release_pr(create_release_pr(&config(), &host, &changelog).await.unwrap());

    assert_eq!(pr.pull_number, Some(100));
    assert_eq!(
        host.created_branches(),
        vec![("release/1.3.0".to_string(), DEVELOP_SHA.to_string())]
    );

    let created = host.created_pull_requests();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].title, "Release Spring");
    assert_eq!(created[0].head, "release/1.3.0");
    assert_eq!(created[0].base, "main");
    assert!(!created[0].maintainer_can_modify);
    assert!(created[0].body.starts_with(NOTES));
    assert!(created[0].body.ends_with("\n\n## Release summary\n\nShip it"));

    assert_eq!(host.labels(100), vec![RELEASE_LABEL.to_string()]);
    assert_eq!(host.comments(100), vec![release_explanation("develop", "main")]);
}

#[tokio::test]
async fn test_changelog_requested_since_latest_release() {
    let host = host();
    let changelog = MockChangelog::new(Changelog::new(None, NOTES));

    create_release_pr(&config(), &host, &changelog).await.unwrap();

    let requests = changelog.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].version, "1.3.0");
    assert_eq!(requests[0].target, "develop");
    assert_eq!(requests[0].since_tag.as_deref(), Some("1.2.0"));
}

#[tokio::test]
async fn test_title_falls_back_to_version() {
    let host = host();
    let changelog = MockChangelog::new(Changelog::new(None, NOTES));

    create_release_pr(&config(), &host, &changelog).await.unwrap();

    assert_eq!(host.created_pull_requests()[0].title, "Release 1.3.0");
}

#[tokio::test]
async fn test_first_release_increments_from_zero() {
    let host = MockHost::new().with_branch("develop", DEVELOP_SHA);
    let changelog = MockChangelog::new(Changelog::new(None, ""));
    let config = Config {
        version_increment: Some(VersionIncrement::Major),
        dry_run: true,
        ..Config::default()
    };

    let pr = release_pr(create_release_pr(&config, &host, &changelog).await.unwrap());

    assert_eq!(pr.version, "1.0.0");
    assert_eq!(pr.latest_release_tag_name, None);
    assert!(pr.pull_numbers_in_release.is_empty());
}

#[tokio::test]
async fn test_override_wins_over_increment() {
    let host = host();
    let changelog = MockChangelog::new(Changelog::new(None, NOTES));
    let config = Config {
        version: Some("5.0.0-rc.1".to_string()),
        dry_run: true,
        ..config()
    };

    let pr = release_pr(create_release_pr(&config, &host, &changelog).await.unwrap());

    assert_eq!(pr.version, "5.0.0-rc.1");
}

#[tokio::test]
async fn test_without_version_settings_uses_commit_hash() {
    let host = host();
    let changelog = MockChangelog::new(Changelog::new(None, NOTES));
    let config = Config {
        dry_run: true,
        ..Config::default()
    };

    let pr = release_pr(create_release_pr(&config, &host, &changelog).await.unwrap());

    assert_eq!(pr.version, DEVELOP_SHA);
    assert_eq!(pr.release_branch, format!("release/{}", DEVELOP_SHA));
}

#[tokio::test]
async fn test_unparseable_latest_tag_aborts_before_mutation() {
    let host = MockHost::new()
        .with_branch("develop", DEVELOP_SHA)
        .with_latest_release("nightly");
    let changelog = MockChangelog::new(Changelog::new(None, NOTES));

    let err = create_release_pr(&config(), &host, &changelog)
        .await
        .unwrap_err();

    assert!(matches!(err, GitflowError::VersionComputation(_)));
    assert_eq!(host.mutation_count(), 0);
    assert!(changelog.requests().is_empty());
}

#[tokio::test]
async fn test_missing_develop_branch_aborts() {
    let host = MockHost::new();
    let changelog = MockChangelog::new(Changelog::new(None, NOTES));

    let err = create_release_pr(&config(), &host, &changelog)
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_existing_release_branch_is_not_rolled_back() {
    let host = host().with_branch("release/1.3.0", "0000000");
    let changelog = MockChangelog::new(Changelog::new(None, NOTES));

    let result = create_release_pr(&config(), &host, &changelog).await;

    assert!(matches!(result, Err(GitflowError::Api { status: 422, .. })));
    assert!(host.created_pull_requests().is_empty());
}

#[tokio::test]
async fn test_rerun_on_existing_comment_keeps_one_comment() {
    let host = host().with_comment(100, release_explanation("develop", "main"));
    let changelog = MockChangelog::new(Changelog::new(None, NOTES));

    create_release_pr(&config(), &host, &changelog).await.unwrap();

    assert_eq!(host.comments(100).len(), 1);
}
