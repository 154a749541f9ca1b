use std::fmt;

/// What a closing pull request represents for the release workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Release,
    Hotfix,
    Unrelated,
}

impl Classification {
    /// Output value used for the `type` key
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Release => "release",
            Classification::Hotfix => "hotfix",
            Classification::Unrelated => "none",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Branch naming rules shared by the classifier and the release PR workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRules {
    pub production: String,
    pub release_prefix: String,
    pub hotfix_prefix: String,
}

impl BranchRules {
    /// Create branch rules
    pub fn new(
        production: impl Into<String>,
        release_prefix: impl Into<String>,
        hotfix_prefix: impl Into<String>,
    ) -> Self {
        BranchRules {
            production: production.into(),
            release_prefix: release_prefix.into(),
            hotfix_prefix: hotfix_prefix.into(),
        }
    }

    /// Classify a pull request by its base and head branch names
    ///
    /// Only pull requests targeting the production branch can be releases.
    /// The release prefix is checked before the hotfix prefix.
    pub fn classify(&self, base: &str, head: &str) -> Classification {
        if base != self.production {
            return Classification::Unrelated;
        }

        if head.starts_with(&self.release_prefix) {
            Classification::Release
        } else if head.starts_with(&self.hotfix_prefix) {
            Classification::Hotfix
        } else {
            Classification::Unrelated
        }
    }

    /// Name of the release branch for a version (e.g. "1.3.0" -> "release/1.3.0")
    pub fn release_branch(&self, version: &str) -> String {
        format!("{}{}", self.release_prefix, version)
    }

    /// Version encoded in a release branch name, if it carries the release prefix
    pub fn version_from_release_branch<'a>(&self, head: &'a str) -> Option<&'a str> {
        head.strip_prefix(self.release_prefix.as_str())
    }
}
