//! Text helpers for activity-page fields.

use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;

static HASHTAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#\w+").expect("valid regex"));

/// Parse a displayed count such as `"1,204"` or `"12 comments"`.
///
/// Every non-digit is dropped before parsing; no digits (or a value too large
/// for `u64`) yields `0`.
#[must_use]
pub fn clean_number(text: &str) -> u64 {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

/// All `#tag` tokens in `text`, in order of appearance.
#[must_use]
pub fn extract_hashtags(text: &str) -> Vec<String> {
    HASHTAG_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Visible text of `element` with each text node trimmed and runs of
/// whitespace collapsed to one space.
#[must_use]
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// First whitespace-separated token, e.g. `"12"` from `"12 comments"`.
#[must_use]
pub fn first_token(text: &str) -> &str {
    text.split_whitespace().next().unwrap_or_default()
}
