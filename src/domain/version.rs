use crate::error::{GitflowError, Result};
use chrono::{DateTime, Utc};
use semver::{Prerelease, Version};
use std::fmt;
use std::str::FromStr;

/// Semantic version increment kinds accepted by `version_increment`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionIncrement {
    Major,
    Premajor,
    Minor,
    Preminor,
    Patch,
    Prepatch,
    Prerelease,
}

impl VersionIncrement {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionIncrement::Major => "major",
            VersionIncrement::Premajor => "premajor",
            VersionIncrement::Minor => "minor",
            VersionIncrement::Preminor => "preminor",
            VersionIncrement::Patch => "patch",
            VersionIncrement::Prepatch => "prepatch",
            VersionIncrement::Prerelease => "prerelease",
        }
    }
}

impl fmt::Display for VersionIncrement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VersionIncrement {
    type Err = GitflowError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "major" => Ok(VersionIncrement::Major),
            "premajor" => Ok(VersionIncrement::Premajor),
            "minor" => Ok(VersionIncrement::Minor),
            "preminor" => Ok(VersionIncrement::Preminor),
            "patch" => Ok(VersionIncrement::Patch),
            "prepatch" => Ok(VersionIncrement::Prepatch),
            "prerelease" => Ok(VersionIncrement::Prerelease),
            other => Err(GitflowError::config(format!(
                "Unknown version increment '{}' - expected one of major, premajor, minor, preminor, patch, prepatch, prerelease",
                other
            ))),
        }
    }
}

/// Version used when no release has been published yet
pub const INITIAL_VERSION: &str = "0.0.0";

/// Parse a tag as a semantic version, tolerating a leading "v" or "="
pub fn parse_loose(tag: &str) -> Result<Version> {
    let clean = tag
        .trim()
        .trim_start_matches(|c: char| c == 'v' || c == 'V' || c == '=' || c.is_whitespace());

    Version::parse(clean).map_err(|e| {
        GitflowError::version(format!("Cannot parse '{}' as a semantic version: {}", tag, e))
    })
}

/// Apply an increment to a version, following npm `semver.inc` rules
///
/// A prerelease of the target version is promoted rather than bumped again,
/// so `1.3.0-2` incremented by `minor` is `1.3.0`.
pub fn increment(version: &Version, kind: VersionIncrement) -> Result<Version> {
    let mut next = Version::new(version.major, version.minor, version.patch);
    let has_pre = !version.pre.is_empty();

    match kind {
        VersionIncrement::Major => {
            if !(has_pre && version.minor == 0 && version.patch == 0) {
                next.major += 1;
            }
            next.minor = 0;
            next.patch = 0;
        }
        VersionIncrement::Minor => {
            if !(has_pre && version.patch == 0) {
                next.minor += 1;
            }
            next.patch = 0;
        }
        VersionIncrement::Patch => {
            if !has_pre {
                next.patch += 1;
            }
        }
        VersionIncrement::Premajor => {
            next.major += 1;
            next.minor = 0;
            next.patch = 0;
            next.pre = prerelease("0")?;
        }
        VersionIncrement::Preminor => {
            next.minor += 1;
            next.patch = 0;
            next.pre = prerelease("0")?;
        }
        VersionIncrement::Prepatch => {
            next.patch += 1;
            next.pre = prerelease("0")?;
        }
        VersionIncrement::Prerelease => {
            if has_pre {
                next.pre = prerelease(&bump_prerelease(version.pre.as_str())?)?;
            } else {
                next.patch += 1;
                next.pre = prerelease("0")?;
            }
        }
    }

    Ok(next)
}

/// Increment the right-most numeric identifier, or append ".0" when there is none
fn bump_prerelease(pre: &str) -> Result<String> {
    let mut parts: Vec<String> = pre.split('.').map(str::to_string).collect();

    let numeric = parts
        .iter()
        .rposition(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));

    match numeric.and_then(|idx| parts[idx].parse::<u64>().ok().map(|n| (idx, n))) {
        Some((idx, n)) => {
            let bumped = n.checked_add(1).ok_or_else(|| {
                GitflowError::version(format!("Prerelease identifier '{}' is too large", n))
            })?;
            parts[idx] = bumped.to_string();
        }
        None => parts.push("0".to_string()),
    }

    Ok(parts.join("."))
}

fn prerelease(text: &str) -> Result<Prerelease> {
    Prerelease::new(text)
        .map_err(|e| GitflowError::version(format!("Invalid prerelease '{}': {}", text, e)))
}

/// Resolve the version of a new release
///
/// Priority:
/// 1. Explicit override, used verbatim
/// 2. Increment applied to the latest release tag (or `0.0.0`)
/// 3. The development branch commit hash
///
/// # Arguments
/// * `latest_tag` - Tag of the most recent published release, if any
/// * `override_version` - Explicit `version` setting
/// * `increment_kind` - `version_increment` setting
/// * `develop_sha` - Full commit hash at the tip of the development branch
pub fn resolve_version(
    latest_tag: Option<&str>,
    override_version: Option<&str>,
    increment_kind: Option<VersionIncrement>,
    develop_sha: &str,
) -> Result<String> {
    if let Some(version) = override_version.filter(|v| !v.is_empty()) {
        return Ok(version.to_string());
    }

    if let Some(kind) = increment_kind {
        let base = latest_tag.unwrap_or(INITIAL_VERSION);
        let current = parse_loose(base)?;
        return Ok(increment(&current, kind)?.to_string());
    }

    Ok(develop_sha.to_string())
}

/// Version for a hotfix merged at the given time: `hotfix-YYYYMMDDHHmm` in UTC
pub fn hotfix_version(merged_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let at = merged_at.unwrap_or(now);
    format!("hotfix-{}", at.format("%Y%m%d%H%M"))
}
