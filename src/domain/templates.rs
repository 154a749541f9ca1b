//! Fixed texts posted to the source-control host.
//!
//! The explanatory comment doubles as its own de-duplication key, so its
//! output must stay byte-for-byte stable for a given pair of branch names.

/// Comment attached to every release pull request
pub fn release_explanation(develop_branch: &str, main_branch: &str) -> String {
    format!(
        "This pull request was opened by the release workflow.\n\
         \n\
         Merging it into `{main}` will:\n\
         \n\
         1. Create a release tagged with the version in the branch name, using this pull request's description as the release notes.\n\
         2. Merge the released changes back into `{develop}`.\n\
         \n\
         Edit the description above to adjust the release notes before merging. \
         Close this pull request without merging to abandon the release.",
        main = main_branch,
        develop = develop_branch,
    )
}

/// Title of the pull request opened when a merge-back cannot be done directly
pub fn merge_fallback_title(head: &str, base: &str) -> String {
    format!("Merge {} into {}", head, base)
}

/// Body of the pull request opened when a merge-back cannot be done directly
pub fn merge_fallback_body(head: &str, base: &str) -> String {
    format!(
        "`{head}` could not be merged into `{base}` automatically, most likely because of a conflict.\n\
         \n\
         Resolve the conflicts in this pull request and merge it to bring `{base}` up to date.",
        head = head,
        base = base,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explanation_mentions_branches() {
        let text = release_explanation("develop", "main");
        assert!(text.contains("`main`"));
        assert!(text.contains("`develop`"));
    }

    #[test]
    fn test_explanation_is_stable() {
        assert_eq!(
            release_explanation("dev", "prod"),
            release_explanation("dev", "prod")
        );
        assert_ne!(
            release_explanation("dev", "prod"),
            release_explanation("develop", "prod")
        );
    }

    #[test]
    fn test_merge_fallback_texts() {
        assert_eq!(
            merge_fallback_title("release/1.0.0", "develop"),
            "Merge release/1.0.0 into develop"
        );
        let body = merge_fallback_body("main", "develop");
        assert!(body.starts_with("`main` could not be merged into `develop`"));
    }
}
