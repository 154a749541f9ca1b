use crate::boundary::BoundaryWarning;
use crate::domain::templates::{merge_fallback_body, merge_fallback_title};
use crate::error::Result;
use crate::host::{NewPullRequest, SourceHost};
use tracing::{info, warn};

/// What happened when bringing `base` up to date with `head`
#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    /// Nothing to merge
    UpToDate,
    /// `head` was merged into `base` directly
    Merged,
    /// The merge failed; a pull request was opened or could not be
    Degraded(BoundaryWarning),
}

impl MergeOutcome {
    pub fn warning(&self) -> Option<&BoundaryWarning> {
        match self {
            MergeOutcome::Degraded(warning) => Some(warning),
            _ => None,
        }
    }

    pub fn into_warning(self) -> Option<BoundaryWarning> {
        match self {
            MergeOutcome::Degraded(warning) => Some(warning),
            _ => None,
        }
    }
}

/// Merge `head` into `base`, falling back to a pull request on failure
///
/// Only the comparison may fail the call. A failed merge opens a pull request
/// instead, and a failure to open that pull request is reported as a warning.
pub async fn try_merge(host: &dyn SourceHost, head: &str, base: &str) -> Result<MergeOutcome> {
    let comparison = host.compare(base, head).await?;
    if comparison.is_identical() {
        info!(head, base, "branches already identical, nothing to merge");
        return Ok(MergeOutcome::UpToDate);
    }

    let merge_error = match host.merge(base, head).await {
        Ok(()) => {
            info!(
                head,
                base,
                ahead_by = comparison.ahead_by,
                behind_by = comparison.behind_by,
                "merged"
            );
            return Ok(MergeOutcome::Merged);
        }
        Err(e) => e,
    };
    warn!(head, base, error = %merge_error, "direct merge failed, opening pull request");

    let request = NewPullRequest {
        title: merge_fallback_title(head, base),
        body: merge_fallback_body(head, base),
        head: head.to_string(),
        base: base.to_string(),
        maintainer_can_modify: true,
    };

    match host.create_pull_request(&request).await {
        Ok(pull_request) => {
            info!(head, base, pull_number = pull_request.number, "opened merge pull request");
            Ok(MergeOutcome::Degraded(BoundaryWarning::MergeFellBack {
                head: head.to_string(),
                base: base.to_string(),
                pull_number: pull_request.number,
            }))
        }
        Err(e) => {
            warn!(head, base, error = %e, "could not open merge pull request");
            Ok(MergeOutcome::Degraded(BoundaryWarning::MergeBackFailed {
                head: head.to_string(),
                base: base.to_string(),
                reason: e.to_string(),
            }))
        }
    }
}
