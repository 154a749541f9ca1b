//! Trigger dispatch
//!
//! Routes the pipeline event to the matching workflow. Kept free of clap and
//! environment access so it can be driven directly from tests.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::announce::ReleaseAnnouncer;
use crate::config::Config;
use crate::error::Result;
use crate::event::Trigger;
use crate::host::{ChangelogService, SourceHost};
use crate::outcome::Outcome;
use crate::workflow::{create_release_pr, execute_on_release};

/// Collaborators a run talks to
pub struct Services<'a> {
    pub host: &'a dyn SourceHost,
    pub changelog: &'a dyn ChangelogService,
    pub announcer: Option<&'a dyn ReleaseAnnouncer>,
}

/// Run the workflow selected by `trigger`
///
/// * Manual trigger - open a release pull request
/// * Closed pull request - finalize the release or hotfix
/// * Anything else - no-op
///
/// # Returns
/// * `Ok(None)` - The event does not start a workflow; nothing is reported
pub async fn dispatch(
    trigger: &Trigger,
    config: &Config,
    services: &Services<'_>,
    now: DateTime<Utc>,
) -> Result<Option<Outcome>> {
    let outcome = match trigger {
        Trigger::Manual => create_release_pr(config, services.host, services.changelog).await?,
        Trigger::PullRequestClosed { number, merged } => {
            execute_on_release(
                config,
                services.host,
                services.announcer,
                *number,
                *merged,
                now,
            )
            .await?
        }
        Trigger::Other(name) => {
            info!(event = %name, "event does not start a workflow");
            return Ok(None);
        }
    };
    Ok(Some(outcome))
}
