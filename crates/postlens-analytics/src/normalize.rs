//! Normalization from raw scraped rows to typed [`NormalizedPost`]s.
//!
//! Parsing here is lossy: malformed cells degrade to an empty or absent
//! value and are tallied in [`NormalizeReport`] instead of failing the run.

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use postlens_core::{DateKind, RawPost};
use regex::Regex;

use crate::dates::{parse_post_date, PostTime};

static QUOTED_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)""#).expect("valid regex")
});
static HASHTAG_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)hashtag$").expect("valid regex"));

/// A deduplicated, cleaned post ready for feature extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPost {
    pub profile: String,
    /// Whitespace-collapsed and trimmed.
    pub text: String,
    pub hashtags: Vec<String>,
    /// The raw date string, kept for persistence.
    pub date: String,
    pub time: PostTime,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
}

impl NormalizedPost {
    #[must_use]
    pub fn total_engagement(&self) -> u64 {
        self.likes
            .saturating_add(self.comments)
            .saturating_add(self.shares)
    }
}

/// Tally of what normalization dropped or defaulted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub rows_in: usize,
    pub duplicates_dropped: usize,
    pub relative_dates: usize,
    pub unparsed_dates: usize,
    pub malformed_hashtags: usize,
    pub defaulted_counts: usize,
}

/// Deduplicate and clean raw rows.
///
/// Duplicates are exact `(profile, text, date)` matches on the raw cells;
/// the first occurrence wins and input order is preserved. `now` anchors
/// relative dates.
#[must_use]
pub fn normalize_posts(
    raw: Vec<RawPost>,
    now: NaiveDateTime,
) -> (Vec<NormalizedPost>, NormalizeReport) {
    let mut report = NormalizeReport {
        rows_in: raw.len(),
        ..NormalizeReport::default()
    };

    let unique = dedupe(raw);
    report.duplicates_dropped = report.rows_in - unique.len();
    tracing::info!(
        remaining = unique.len(),
        dropped = report.duplicates_dropped,
        "removed duplicate posts"
    );

    let posts = unique
        .into_iter()
        .enumerate()
        .map(|(idx, row)| normalize_row(idx, row, now, &mut report))
        .collect();

    if report.unparsed_dates > 0 || report.malformed_hashtags > 0 || report.defaulted_counts > 0 {
        tracing::warn!(
            unparsed_dates = report.unparsed_dates,
            malformed_hashtags = report.malformed_hashtags,
            defaulted_counts = report.defaulted_counts,
            "some fields could not be parsed and were defaulted"
        );
    }
    if report.relative_dates > 0 {
        tracing::info!(
            relative_dates = report.relative_dates,
            "relative dates resolved against the current wall clock"
        );
    }

    (posts, report)
}

/// Keep the first row of every `(profile, text, date)` triple.
#[must_use]
pub fn dedupe(raw: Vec<RawPost>) -> Vec<RawPost> {
    let mut seen: HashSet<(Option<String>, Option<String>, Option<String>)> = HashSet::new();
    raw.into_iter()
        .filter(|row| seen.insert((row.profile.clone(), row.text.clone(), row.date.clone())))
        .collect()
}

fn normalize_row(
    idx: usize,
    row: RawPost,
    now: NaiveDateTime,
    report: &mut NormalizeReport,
) -> NormalizedPost {
    let time = parse_post_date(row.date.as_deref(), now);
    match time.kind {
        DateKind::Relative => report.relative_dates += 1,
        DateKind::Unparsed => {
            tracing::debug!(row = idx, date = ?row.date, "date not parsed");
            report.unparsed_dates += 1;
        }
        DateKind::Absolute => {}
    }

    let hashtags = parse_hashtags(row.hashtags.as_deref()).unwrap_or_else(|| {
        tracing::debug!(row = idx, hashtags = ?row.hashtags, "hashtag list not parsed");
        report.malformed_hashtags += 1;
        Vec::new()
    });

    let mut count = |field: &str, raw: Option<&str>| -> u64 {
        coerce_count(raw).unwrap_or_else(|| {
            if raw.is_some_and(|r| !r.trim().is_empty()) {
                tracing::debug!(row = idx, field, value = ?raw, "engagement count not parsed");
            }
            report.defaulted_counts += 1;
            0
        })
    };
    let likes = count("likes", row.likes.as_deref());
    let comments = count("comments", row.comments.as_deref());
    let shares = count("shares", row.shares.as_deref());

    NormalizedPost {
        profile: row.profile.unwrap_or_default(),
        text: clean_text(row.text.as_deref().unwrap_or_default()),
        hashtags,
        date: row.date.unwrap_or_default(),
        time,
        likes,
        comments,
        shares,
    }
}

/// Collapse runs of whitespace to a single space and trim the ends.
#[must_use]
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a serialized hashtag list.
///
/// Accepts a JSON array of strings or a Python-style list literal. An absent
/// or blank cell is an empty list. Returns `None` for anything else. Each
/// tag loses a trailing case-insensitive `hashtag` suffix.
#[must_use]
pub fn parse_hashtags(raw: Option<&str>) -> Option<Vec<String>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Some(Vec::new());
    };

    let tags = if let Ok(tags) = serde_json::from_str::<Vec<String>>(raw) {
        tags
    } else {
        parse_list_literal(raw)?
    };

    Some(
        tags.iter()
            .map(|tag| HASHTAG_SUFFIX_RE.replace(tag, "").into_owned())
            .collect(),
    )
}

fn parse_list_literal(raw: &str) -> Option<Vec<String>> {
    let inner = raw.strip_prefix('[')?.strip_suffix(']')?;

    let leftover = QUOTED_ITEM_RE.replace_all(inner, "");
    if !leftover.chars().all(|c| c == ',' || c.is_whitespace()) {
        return None;
    }

    let items = QUOTED_ITEM_RE
        .captures_iter(inner)
        .filter_map(|cap| cap.get(1).or_else(|| cap.get(2)))
        .map(|m| unescape(m.as_str()))
        .collect();
    Some(items)
}

fn unescape(item: &str) -> String {
    let mut out = String::with_capacity(item.len());
    let mut chars = item.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Coerce an engagement cell to a non-negative integer.
///
/// Integers and floats (truncated) are accepted; negatives clamp to zero.
/// Returns `None` when the cell is absent or not numeric.
#[must_use]
pub fn coerce_count(raw: Option<&str>) -> Option<u64> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    if let Ok(n) = raw.parse::<i64>() {
        return Some(u64::try_from(n).unwrap_or(0));
    }
    let f = raw.parse::<f64>().ok().filter(|f| f.is_finite())?;
    if f <= 0.0 {
        return Some(0);
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n = f.trunc() as u64;
    Some(n)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
