//! Pure text transforms turning release notes into Slack mrkdwn.
//!
//! Applied in order by [transform]: strip HTML comments, convert markdown,
//! rewrite changelog bullets, map `@username` mentions.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

static HTML_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment pattern"));
static HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s{0,3}#{1,6}\s+(.+?)(?:\s+#+)?\s*$").expect("valid heading pattern")
});
static BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)[-*+]\s+").expect("valid bullet pattern"));
static IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)\s]+)[^)]*\)").expect("valid image pattern"));
static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)\s]+)[^)]*\)").expect("valid link pattern"));
static BOLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\*\*|__)(\S(?:.*?\S)?)(\*\*|__)").expect("valid bold pattern"));
static ITALIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*([^*\s](?:[^*]*[^*\s])?)\*").expect("valid italic pattern")
});
static STRIKE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"~~(.+?)~~").expect("valid strikethrough pattern"));
static CHANGELOG_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*)• (.+) by (\S+) in <?(https?://[^\s>|]+)>?\s*$")
        .expect("valid changelog item pattern")
});
static ANGLE_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^<>]*>").expect("valid angle span pattern"));
static MENTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^|[^\w<])@([A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)")
        .expect("valid mention pattern")
});

/// Placeholder for bold markers so the italic pass leaves them alone
const BOLD_MARK: char = '\u{1}';

/// Run the full release-notes pipeline
pub fn transform(body: &str, username_mapping: &HashMap<String, String>) -> String {
    let text = strip_comments(body);
    let text = markdown_to_mrkdwn(&text);
    let text = rewrite_changelog_items(&text);
    map_mentions(&text, username_mapping)
}

/// Remove `<!-- ... -->` comments, including multi-line ones
pub fn strip_comments(text: &str) -> String {
    HTML_COMMENT.replace_all(text, "").into_owned()
}

/// Convert markdown to Slack mrkdwn
///
/// Fenced code blocks and inline code spans are passed through untouched.
pub fn markdown_to_mrkdwn(markdown: &str) -> String {
    let mut in_fence = false;
    let mut lines = Vec::new();

    for line in markdown.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            lines.push(line.trim().to_string());
            continue;
        }
        if in_fence {
            lines.push(line.to_string());
            continue;
        }
        lines.push(convert_line(line));
    }

    lines.join("\n").trim().to_string()
}

fn convert_line(line: &str) -> String {
    if let Some(caps) = HEADING.captures(line) {
        let title = convert_inline(&caps[1]);
        return format!("*{}*", title.trim_matches('*'));
    }

    let (indent, rest) = match BULLET.captures(line) {
        Some(caps) => {
            let whole = caps.get(0).map_or(0, |m| m.end());
            (format!("{}• ", &caps[1]), &line[whole..])
        }
        None => (String::new(), line),
    };

    format!("{}{}", indent, convert_inline(rest))
}

/// Convert inline markup outside of backtick code spans
fn convert_inline(text: &str) -> String {
    text.split('`')
        .enumerate()
        .map(|(i, segment)| {
            if i % 2 == 1 {
                segment.to_string()
            } else {
                convert_segment(segment)
            }
        })
        .collect::<Vec<_>>()
        .join("`")
}

fn convert_segment(segment: &str) -> String {
    let text = escape(segment);
    let text = IMAGE.replace_all(&text, "<$2|$1>");
    let text = LINK.replace_all(&text, "<$2|$1>");
    let text = BOLD.replace_all(&text, |caps: &Captures| {
        format!("{}{}{}", BOLD_MARK, &caps[2], BOLD_MARK)
    });
    let text = italicize(&text);
    let text = STRIKE.replace_all(&text, "~$1~");
    text.replace(BOLD_MARK, "*")
}

/// `*x*` to `_x_` when the stars are not glued to a word or another star
fn italicize(text: &str) -> String {
    let glued = |c: char| c == '*' || c == '_' || c.is_alphanumeric();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for caps in ITALIC.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let before = text[..whole.start()].chars().next_back();
        let after = text[whole.end()..].chars().next();
        if before.is_some_and(glued) || after.is_some_and(glued) {
            continue;
        }

        out.push_str(&text[last..whole.start()]);
        out.push('_');
        out.push_str(inner.as_str());
        out.push('_');
        last = whole.end();
    }

    out.push_str(&text[last..]);
    out
}

pub(crate) fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Turn `• <title> by <author> in <link>` into `• <link|title> by <author>`
pub fn rewrite_changelog_items(text: &str) -> String {
    text.lines()
        .map(|line| CHANGELOG_ITEM.replace(line, "$1• <$4|$2> by $3").into_owned())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Replace `@username` with `<@USERID>` for mapped users; unmapped names stay as-is
///
/// Text inside `<...>` links is left alone.
pub fn map_mentions(text: &str, username_mapping: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for span in ANGLE_SPAN.find_iter(text) {
        out.push_str(&replace_mentions(&text[last..span.start()], username_mapping));
        out.push_str(span.as_str());
        last = span.end();
    }

    out.push_str(&replace_mentions(&text[last..], username_mapping));
    out
}

fn replace_mentions(text: &str, username_mapping: &HashMap<String, String>) -> String {
    MENTION
        .replace_all(text, |caps: &Captures| match username_mapping.get(&caps[2]) {
            Some(user_id) => format!("{}<@{}>", &caps[1], user_id),
            None => caps[0].to_string(),
        })
        .into_owned()
}
