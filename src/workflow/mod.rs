//! Release workflows driven against a [crate::host::SourceHost]
//!
//! - `release_pr` - Propose a release from the development branch
//! - `finalize` - Publish a merged release or hotfix
//! - `merge` - Best-effort merge-back shared by both

pub mod finalize;
pub mod merge;
pub mod release_pr;

pub use finalize::execute_on_release;
pub use merge::{try_merge, MergeOutcome};
pub use release_pr::{create_release_pr, ensure_comment, RELEASE_LABEL};
