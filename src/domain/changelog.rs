use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static PULL_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"pull/(\d+)").expect("valid pull reference pattern"));

/// Release notes produced by the changelog service
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Changelog {
    /// Suggested release name, if the service derived one
    pub name: Option<String>,
    /// Release notes in markdown
    pub markdown: String,
}

impl Changelog {
    pub fn new(name: Option<String>, markdown: impl Into<String>) -> Self {
        Changelog {
            name,
            markdown: markdown.into(),
        }
    }

    /// Numbers of every pull request referenced as `pull/<n>`, deduplicated and ascending
    pub fn pull_numbers(&self) -> Vec<u64> {
        PULL_REFERENCE
            .captures_iter(&self.markdown)
            .filter_map(|caps| caps.get(1)?.as_str().parse::<u64>().ok())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Title for the release pull request
    pub fn pull_request_title(&self, version: &str) -> String {
        let name = self
            .name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(version);
        format!("Release {}", name)
    }

    /// Body for the release pull request: the notes followed by the release summary section
    pub fn pull_request_body(&self, release_summary: &str) -> String {
        format!(
            "{}\n\n## Release summary\n\n{}",
            self.markdown, release_summary
        )
    }
}

/// Join pull request numbers for the `pull_numbers_in_release` output
pub fn join_pull_numbers(numbers: &[u64]) -> String {
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
