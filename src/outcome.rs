use crate::boundary::BoundaryWarning;
use crate::domain::{join_pull_numbers, Classification};
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;

/// Result of the release pull request workflow
#[derive(Debug, Clone, PartialEq)]
pub struct ReleasePrOutcome {
    /// Absent in dry-run
    pub pull_number: Option<u64>,
    /// Pull requests bundled into the release, ascending
    pub pull_numbers_in_release: Vec<u64>,
    pub version: String,
    pub release_branch: String,
    pub latest_release_tag_name: Option<String>,
}

/// Result of finalizing a merged release or hotfix
#[derive(Debug, Clone, PartialEq)]
pub struct ReleasedOutcome {
    pub kind: Classification,
    pub version: String,
    pub release_url: String,
    pub warnings: Vec<BoundaryWarning>,
}

/// What a run reports back to the pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    None,
    ReleasePr(ReleasePrOutcome),
    Released(ReleasedOutcome),
}

impl Outcome {
    /// Value of the `type` output
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::None => "none",
            Outcome::ReleasePr(_) => "release",
            Outcome::Released(released) => released.kind.as_str(),
        }
    }

    pub fn warnings(&self) -> &[BoundaryWarning] {
        match self {
            Outcome::Released(released) => &released.warnings,
            _ => &[],
        }
    }

    /// Output variables in the order they are written
    pub fn outputs(&self) -> Vec<(&'static str, String)> {
        let mut outputs = vec![("type", self.kind().to_string())];

        match self {
            Outcome::None => {}
            Outcome::ReleasePr(pr) => {
                if let Some(number) = pr.pull_number {
                    outputs.push(("pull_number", number.to_string()));
                }
                outputs.push((
                    "pull_numbers_in_release",
                    join_pull_numbers(&pr.pull_numbers_in_release),
                ));
                outputs.push(("version", pr.version.clone()));
                outputs.push(("release_branch", pr.release_branch.clone()));
                if let Some(tag) = &pr.latest_release_tag_name {
                    outputs.push(("latest_release_tag_name", tag.clone()));
                }
            }
            Outcome::Released(released) => {
                outputs.push(("version", released.version.clone()));
                outputs.push(("release_url", released.release_url.clone()));
            }
        }

        let warnings = self.warnings();
        if !warnings.is_empty() {
            let lines: Vec<String> = warnings.iter().map(|w| w.to_string()).collect();
            outputs.push(("warnings", lines.join("\n")));
        }

        outputs
    }
}

/// Appends every output to the GitHub Actions output file when running inside Actions.
pub fn write_outputs(outcome: &Outcome) -> Result<()> {
    let Some(path) = std::env::var_os("GITHUB_OUTPUT") else {
        return Ok(());
    };

    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .context("failed to open GITHUB_OUTPUT file")?;

    for (key, value) in outcome.outputs() {
        write_output(&mut file, key, &value)?;
    }
    Ok(())
}

/// Single-line values use `key=value`; multi-line values use heredoc syntax.
pub fn write_output<W: Write>(out: &mut W, key: &str, value: &str) -> Result<()> {
    if !value.contains('\n') {
        writeln!(out, "{key}={value}").context("failed to write GITHUB_OUTPUT entry")?;
        return Ok(());
    }

    let delimiter = unique_delimiter(value);
    writeln!(out, "{key}<<{delimiter}").context("failed to write GITHUB_OUTPUT header")?;
    writeln!(out, "{value}").context("failed to write GITHUB_OUTPUT value body")?;
    writeln!(out, "{delimiter}").context("failed to write GITHUB_OUTPUT footer")?;
    Ok(())
}

fn unique_delimiter(value: &str) -> String {
    let base = "__GITFLOW_OUTPUT__";
    if !value.contains(base) {
        return base.to_string();
    }
    (1..)
        .map(|idx| format!("{base}_{idx}"))
        .find(|candidate| !value.contains(candidate.as_str()))
        .unwrap_or_else(|| format!("{base}_FALLBACK"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release_pr(pull_number: Option<u64>, latest: Option<&str>) -> Outcome {
        Outcome::ReleasePr(ReleasePrOutcome {
            pull_number,
            pull_numbers_in_release: vec![7, 12],
            version: "1.3.0".to_string(),
            release_branch: "release/1.3.0".to_string(),
            latest_release_tag_name: latest.map(str::to_string),
        })
    }

    #[test]
    fn test_none_outputs() {
        assert_eq!(Outcome::None.outputs(), vec![("type", "none".to_string())]);
    }

    #[test]
    fn test_release_pr_outputs() {
        let outputs = release_pr(Some(101), Some("1.2.0")).outputs();
        assert_eq!(
            outputs,
            vec![
                ("type", "release".to_string()),
                ("pull_number", "101".to_string()),
                ("pull_numbers_in_release", "7,12".to_string()),
                ("version", "1.3.0".to_string()),
                ("release_branch", "release/1.3.0".to_string()),
                ("latest_release_tag_name", "1.2.0".to_string()),
            ]
        );
    }

    #[test]
    fn test_dry_run_outputs_skip_absent_values() {
        let outputs = release_pr(None, None).outputs();
        assert!(!outputs.iter().any(|(k, _)| *k == "pull_number"));
        assert!(!outputs.iter().any(|(k, _)| *k == "latest_release_tag_name"));
    }

    #[test]
    fn test_released_outputs_with_warnings() {
        let outcome = Outcome::Released(ReleasedOutcome {
            kind: Classification::Hotfix,
            version: "hotfix-202403050807".to_string(),
            release_url: "https://example.test/r".to_string(),
            warnings: vec![BoundaryWarning::MergeFellBack {
                head: "main".to_string(),
                base: "develop".to_string(),
                pull_number: 5,
            }],
        });
        let outputs = outcome.outputs();
        assert_eq!(outputs[0], ("type", "hotfix".to_string()));
        assert_eq!(outputs[1], ("version", "hotfix-202403050807".to_string()));
        assert_eq!(outputs[2], ("release_url", "https://example.test/r".to_string()));
        assert_eq!(outputs[3].0, "warnings");
    }

    #[test]
    fn test_write_single_line() {
        let mut buf = Vec::new();
        write_output(&mut buf, "version", "1.3.0").unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "version=1.3.0\n");
    }

    #[test]
    fn test_write_multi_line() {
        let mut buf = Vec::new();
        write_output(&mut buf, "warnings", "one\ntwo").unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "warnings<<__GITFLOW_OUTPUT__\none\ntwo\n__GITFLOW_OUTPUT__\n"
        );
    }

    #[test]
    fn test_unique_delimiter_avoids_collisions() {
        assert_eq!(unique_delimiter("plain"), "__GITFLOW_OUTPUT__");
        assert_eq!(
            unique_delimiter("has __GITFLOW_OUTPUT__ inside"),
            "__GITFLOW_OUTPUT___1"
        );
    }
}
