//! Title cleaning and slug derivation.

use std::sync::LazyLock;

use regex::Regex;

/// Quote characters editors wrap titles in.
const QUOTE_CHARS: &[char] = &['"', '\'', '“', '”', '‘', '’'];

/// Derive a URL-safe slug from a title.
///
/// Lowercases, drops anything that is not a word character, whitespace or
/// hyphen, then turns each whitespace run into a single hyphen.
pub fn slugify(title: &str) -> String {
    static NON_SLUG_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("valid regex"));
    static SPACE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

    let lower = title.trim().to_lowercase();
    let kept = NON_SLUG_RE.replace_all(&lower, "");
    let hyphenated = SPACE_RE.replace_all(kept.trim(), "-");

    hyphenated.trim_matches('-').to_string()
}

/// Split a `"<digits>. "` ordinal prefix off a title.
///
/// Returns the parsed number (if any) and the remainder.
pub fn strip_ordinal_prefix(title: &str) -> (Option<u32>, &str) {
    static ORDINAL_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^\s*(\d+)\.\s+").expect("valid regex"));

    match ORDINAL_RE.captures(title) {
        Some(caps) => {
            let end = caps.get(0).map_or(0, |m| m.end());
            let number = caps[1].parse::<u32>().ok();
            (number, &title[end..])
        }
        None => (None, title),
    }
}

/// Clean an editor-supplied title for display.
///
/// Strips surrounding quotes and the ordinal prefix, in either nesting order.
pub fn clean_title(raw: &str) -> (Option<u32>, String) {
    let unquoted = raw.trim().trim_matches(QUOTE_CHARS).trim();
    let (ordinal, rest) = strip_ordinal_prefix(unquoted);
    let title = rest.trim().trim_matches(QUOTE_CHARS).trim();
    (ordinal, title.to_string())
}

/// Drop a leading `^\d+[-_]` ordinal from a slug.
pub(crate) fn strip_slug_prefix(slug: &str) -> Option<&str> {
    static SLUG_PREFIX_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^\d+[-_]").expect("valid regex"));

    SLUG_PREFIX_RE.find(slug).map(|m| &slug[m.end()..])
}

/// Leading ASCII digits of a slug, if it starts with any.
pub(crate) fn leading_number(slug: &str) -> Option<&str> {
    let end = slug
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(slug.len(), |(i, _)| i);

    if end == 0 { None } else { Some(&slug[..end]) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Study Tips"), "study-tips");
        assert_eq!(slugify("  Exam   Prep: Without Panic! "), "exam-prep-without-panic");
        assert_eq!(slugify("Parents' Guide: Part 2"), "parents-guide-part-2");
    }

    #[test]
    fn slugify_keeps_hyphens_and_underscores() {
        assert_eq!(slugify("Pre-exam snake_case"), "pre-exam-snake_case");
    }

    #[test]
    fn slugify_punctuation_only_is_empty() {
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn ordinal_prefix_parsed() {
        assert_eq!(strip_ordinal_prefix("3. Exam Prep"), (Some(3), "Exam Prep"));
        assert_eq!(strip_ordinal_prefix("Exam Prep"), (None, "Exam Prep"));
        // No space after the dot means it is not an ordinal.
        assert_eq!(strip_ordinal_prefix("3.5 ways"), (None, "3.5 ways"));
    }

    #[test]
    fn clean_title_handles_quotes_both_ways() {
        assert_eq!(clean_title("1. \"Study Tips\""), (Some(1), "Study Tips".into()));
        assert_eq!(clean_title("\"2. Study Tips\""), (Some(2), "Study Tips".into()));
        assert_eq!(clean_title("“Curly”"), (None, "Curly".into()));
    }

    #[test]
    fn slug_prefix_and_leading_number() {
        assert_eq!(strip_slug_prefix("2-study-tips"), Some("study-tips"));
        assert_eq!(strip_slug_prefix("10_exam"), Some("exam"));
        assert_eq!(strip_slug_prefix("study-tips"), None);

        assert_eq!(leading_number("12-abc"), Some("12"));
        assert_eq!(leading_number("abc"), None);
        assert_eq!(leading_number("7"), Some("7"));
    }
}
