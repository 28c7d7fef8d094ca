//! Removal of full-document wrapper tags from CMS free-text fields.

use std::sync::LazyLock;

use regex::Regex;

/// Placeholder shown when a text field is missing or blank.
pub const NO_DESCRIPTION: &str = "No description available";

/// Remove every `<html ...>`, `</html>`, `<body ...>` and `</body>` tag.
///
/// Matching is case-insensitive and tolerates arbitrary attributes. The text
/// between the tags is kept and no other tag is touched. The pass repeats
/// until nothing matches, so the result is stable under a second call.
pub fn strip_structural_markup(text: &str) -> String {
    static WRAPPER_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)</?(?:html|body)(?:\s[^>]*)?/?>").expect("valid regex")
    });

    let mut current = text.to_string();
    loop {
        let next = WRAPPER_RE.replace_all(&current, "").into_owned();
        if next == current {
            return next;
        }
        current = next;
    }
}

/// Strip wrapper tags, substituting `fallback` when nothing useful remains.
pub fn strip_or_fallback(text: Option<&str>, fallback: &str) -> String {
    let Some(text) = text else {
        return fallback.to_string();
    };

    let stripped = strip_structural_markup(text);
    if stripped.trim().is_empty() {
        fallback.to_string()
    } else {
        stripped
    }
}
