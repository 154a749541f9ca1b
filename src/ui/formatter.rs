//! Pure formatting functions for UI output.
//!
//! Summaries go to stdout; errors go to stderr. Styling comes from `console`,
//! which drops colours on its own when the stream is not a terminal.

use console::style;

use crate::boundary::BoundaryWarning;
use crate::outcome::Outcome;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Workflow command reporting a failure to the pipeline.
///
/// `%`, CR and LF are percent-encoded so multi-line messages survive.
pub fn error_annotation(message: &str) -> String {
    let escaped = message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A");
    format!("::error::{}", escaped)
}

/// Display a non-fatal warning recorded during the run.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    println!("{} {}", style("⚠").yellow().bold(), warning);
}

/// Headline and detail lines describing an outcome, unstyled
pub fn outcome_lines(outcome: &Outcome) -> (String, Vec<String>) {
    match outcome {
        Outcome::None => ("Nothing to do".to_string(), Vec::new()),
        Outcome::ReleasePr(pr) => {
            let headline = match pr.pull_number {
                Some(number) => {
                    format!("Opened release pull request #{} for {}", number, pr.version)
                }
                None => format!("Dry run: would open release pull request for {}", pr.version),
            };
            let mut details = vec![format!("branch: {}", pr.release_branch)];
            if let Some(tag) = &pr.latest_release_tag_name {
                details.push(format!("previous release: {}", tag));
            }
            if !pr.pull_numbers_in_release.is_empty() {
                let numbers: Vec<String> = pr
                    .pull_numbers_in_release
                    .iter()
                    .map(|n| format!("#{}", n))
                    .collect();
                details.push(format!("includes: {}", numbers.join(", ")));
            }
            (headline, details)
        }
        Outcome::Released(released) => (
            format!("Published {} {}", released.kind, released.version),
            vec![format!("url: {}", released.release_url)],
        ),
    }
}

/// Print the result of a run followed by its warnings.
pub fn display_outcome(outcome: &Outcome) {
    let (headline, details) = outcome_lines(outcome);
    match outcome {
        Outcome::None => display_status(&headline),
        _ => display_success(&headline),
    }
    for line in details {
        println!("  {}", style(line).dim());
    }
    for warning in outcome.warnings() {
        display_boundary_warning(warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Classification;
    use crate::outcome::{ReleasePrOutcome, ReleasedOutcome};

    #[test]
    fn test_error_annotation_escapes_newlines_and_percent() {
        assert_eq!(
            error_annotation("release failed: 100% broken\r\ncaused by: conflict"),
            "::error::release failed: 100%25 broken%0D%0Acaused by: conflict"
        );
        assert_eq!(error_annotation("plain"), "::error::plain");
    }

    #[test]
    fn test_none_lines() {
        let (headline, details) = outcome_lines(&Outcome::None);
        assert_eq!(headline, "Nothing to do");
        assert!(details.is_empty());
    }

    #[test]
    fn test_dry_run_lines() {
        let outcome = Outcome::ReleasePr(ReleasePrOutcome {
            pull_number: None,
            pull_numbers_in_release: vec![7, 12],
            version: "1.3.0".to_string(),
            release_branch: "release/1.3.0".to_string(),
            latest_release_tag_name: Some("1.2.0".to_string()),
        });
        let (headline, details) = outcome_lines(&outcome);
        assert_eq!(headline, "Dry run: would open release pull request for 1.3.0");
        assert_eq!(
            details,
            vec![
                "branch: release/1.3.0".to_string(),
                "previous release: 1.2.0".to_string(),
                "includes: #7, #12".to_string(),
            ]
        );
    }

    #[test]
    fn test_released_lines() {
        let outcome = Outcome::Released(ReleasedOutcome {
            kind: Classification::Release,
            version: "2.0.0".to_string(),
            release_url: "https://example.test/r/2.0.0".to_string(),
            warnings: Vec::new(),
        });
        let (headline, details) = outcome_lines(&outcome);
        assert_eq!(headline, "Published release 2.0.0");
        assert_eq!(details, vec!["url: https://example.test/r/2.0.0".to_string()]);
    }
}
