//! Domain logic - pure release rules independent of the hosting service

pub mod branch;
pub mod changelog;
pub mod templates;
pub mod version;

pub use branch::{BranchRules, Classification};
pub use changelog::{join_pull_numbers, Changelog};
pub use version::{hotfix_version, resolve_version, VersionIncrement};
