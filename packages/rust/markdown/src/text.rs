//! Plain-text helpers: word counts, read-time estimates, excerpts.

use std::sync::LazyLock;

use regex::Regex;

/// Reduce markdown or an HTML fragment to whitespace-normalized plain text.
pub fn to_plain_text(text: &str) -> String {
    static TAG_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
    static HEADING_MARK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?m)^\s*#{1,6}\s+").expect("valid regex"));

    let without_tags = TAG_RE.replace_all(text, " ");
    let without_headings = HEADING_MARK_RE.replace_all(&without_tags, "");
    let without_bold = without_headings.replace("**", "");

    without_bold.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Count words in markdown text, ignoring markup.
pub fn word_count(text: &str) -> usize {
    to_plain_text(text).split_whitespace().count()
}

/// Estimated reading time in whole minutes, never less than one.
pub fn read_time_minutes(text: &str, words_per_minute: u32) -> u32 {
    let wpm = words_per_minute.max(1) as usize;
    let words = word_count(text);
    let minutes = words.div_ceil(wpm);
    u32::try_from(minutes).unwrap_or(u32::MAX).max(1)
}

/// Plain-text excerpt of at most `max_chars` characters.
///
/// Truncation happens on a word boundary and appends an ellipsis.
pub fn plain_excerpt(text: &str, max_chars: usize) -> String {
    let plain = to_plain_text(text);
    if plain.chars().count() <= max_chars {
        return plain;
    }

    let cut: String = plain.chars().take(max_chars).collect();
    let trimmed = match cut.rfind(char::is_whitespace) {
        Some(idx) if idx > 0 => &cut[..idx],
        _ => cut.as_str(),
    };

    format!("{}…", trimmed.trim_end_matches(|c: char| c.is_ascii_punctuation()))
}
