use std::fmt;

/// Non-fatal problems met while finalizing a release.
/// They never abort the run but are reported back to the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// Direct merge failed; a pull request was opened instead
    MergeFellBack {
        head: String,
        base: String,
        pull_number: u64,
    },
    /// Direct merge failed and the fallback pull request could not be opened either
    MergeBackFailed {
        head: String,
        base: String,
        reason: String,
    },
    /// Production carries changes the merged head branch does not
    DivergentProduction { production: String, head: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::MergeFellBack {
                head,
                base,
                pull_number,
            } => write!(
                f,
                "Could not merge '{}' into '{}'; opened pull request #{}",
                head, base, pull_number
            ),
            BoundaryWarning::MergeBackFailed { head, base, reason } => write!(
                f,
                "Could not merge '{}' into '{}' nor open a pull request: {}",
                head, base, reason
            ),
            BoundaryWarning::DivergentProduction { production, head } => write!(
                f,
                "'{}' contains changes missing from '{}'; merging '{}' back may not carry them",
                production, head, head
            ),
        }
    }
}
