//! Markdown-subset to HTML formatter.
//!
//! This is a substitution pipeline, not a parser. Each pass is a function
//! `&str -> String` applied in a fixed order so later passes never re-match
//! markup produced by earlier ones. Unsupported or malformed syntax is left
//! in place as literal text.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::instrument;

const PARA_BREAK: &str = "</p><p>";

/// Convert the supported markdown subset to an HTML fragment.
///
/// Supported: blank-line paragraphs, `**bold**`, `# ` and `## ` headings,
/// single-newline line breaks. Empty input yields an empty string.
#[instrument(level = "trace", skip_all, fields(len = markdown.len()))]
pub fn format_content(markdown: &str) -> String {
    let normalized = markdown.replace("\r\n", "\n");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let mut html = trimmed.to_string();

    html = paragraph_breaks(&html);
    html = bold(&html);
    html = headings(&html);
    html = line_breaks(&html);
    html = wrap_and_collapse(&html);

    html
}

// ---------------------------------------------------------------------------
// Pass 1: Paragraph breaks
// ---------------------------------------------------------------------------

fn paragraph_breaks(md: &str) -> String {
    md.replace("\n\n", PARA_BREAK)
}

// ---------------------------------------------------------------------------
// Pass 2: Bold
// ---------------------------------------------------------------------------

/// `**text**` on a single line. Spans that would cross a paragraph break stay literal.
fn bold(md: &str) -> String {
    static BOLD_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\*\*([^*\n]+?)\*\*").expect("valid regex"));

    BOLD_RE
        .replace_all(md, |caps: &Captures| {
            let inner = &caps[1];
            if inner.contains(PARA_BREAK) {
                caps[0].to_string()
            } else {
                format!("<strong>{inner}</strong>")
            }
        })
        .into_owned()
}

// ---------------------------------------------------------------------------
// Pass 3: Headings
// ---------------------------------------------------------------------------

/// `# ` / `## ` at a line start or directly after a paragraph opener.
///
/// A heading closes the current paragraph and reopens one after itself, so
/// the wrap pass never leaves a `<p>` around a heading.
fn headings(md: &str) -> String {
    // Heading text stops at a newline or at the `</p>` inserted by pass 1.
    static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?m)(^|<p>)(#{1,2}) ((?:[^\n<]|<[^/\n]|</[^p\n])+)\n?")
            .expect("valid regex")
    });

    HEADING_RE
        .replace_all(md, |caps: &Captures| {
            let prefix = &caps[1];
            let level = caps[2].len();
            let text = caps[3].trim();

            if text.is_empty() {
                return caps[0].to_string();
            }

            format!("{prefix}</p><h{level}>{text}</h{level}><p>")
        })
        .into_owned()
}

// ---------------------------------------------------------------------------
// Pass 4: Line breaks
// ---------------------------------------------------------------------------

fn line_breaks(md: &str) -> String {
    md.replace('\n', "<br>")
}

// ---------------------------------------------------------------------------
// Pass 5: Wrap and collapse
// ---------------------------------------------------------------------------

/// Wrap in one outer paragraph, then remove the empty and doubled tags the
/// earlier passes leave behind. Repeats until nothing changes.
fn wrap_and_collapse(html: &str) -> String {
    static EMPTY_P_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<p>\s*</p>").expect("valid regex"));
    static LEADING_BR_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<p>(?:\s*<br>)+").expect("valid regex"));
    static TRAILING_BR_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?:<br>\s*)+</p>").expect("valid regex"));
    static DOUBLE_OPEN_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<p>\s*<p>").expect("valid regex"));
    static DOUBLE_CLOSE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"</p>\s*</p>").expect("valid regex"));
    static WRAPPED_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"<p>(<h[12]>(?:[^<]|<[^/]|</[^h])*</h[12]>)</p>").expect("valid regex")
    });

    let mut current = format!("<p>{html}</p>");

    loop {
        let mut next = EMPTY_P_RE.replace_all(&current, "").into_owned();
        next = LEADING_BR_RE.replace_all(&next, "<p>").into_owned();
        next = TRAILING_BR_RE.replace_all(&next, "</p>").into_owned();
        next = DOUBLE_OPEN_RE.replace_all(&next, "<p>").into_owned();
        next = DOUBLE_CLOSE_RE.replace_all(&next, "</p>").into_owned();
        next = WRAPPED_HEADING_RE.replace_all(&next, "$1").into_owned();

        if next == current {
            return next;
        }
        current = next;
    }
}
