//! Best-effort parsing of the scraped date column into hour and weekday.
//!
//! Relative strings ("3d ago") are resolved against the `now` passed in by
//! the caller, which the pipeline sets to the local wall clock. Hour and day
//! for such rows therefore change from run to run.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Timelike};
use postlens_core::DateKind;
use regex::Regex;

static RELATIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*([a-z]+)").expect("valid regex"));

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"];

/// Hour and weekday derived from a raw date string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostTime {
    pub kind: DateKind,
    pub hour: Option<u8>,
    /// Full weekday name, e.g. `"Tuesday"`.
    pub day: Option<String>,
}

impl PostTime {
    #[must_use]
    pub fn unparsed() -> Self {
        Self {
            kind: DateKind::Unparsed,
            hour: None,
            day: None,
        }
    }

    fn at(kind: DateKind, timestamp: NaiveDateTime) -> Self {
        Self {
            kind,
            hour: u8::try_from(timestamp.hour()).ok(),
            day: Some(timestamp.format("%A").to_string()),
        }
    }
}

/// Parse a raw date cell. Never fails: anything unrecognised yields
/// [`PostTime::unparsed`].
#[must_use]
pub fn parse_post_date(raw: Option<&str>, now: NaiveDateTime) -> PostTime {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return PostTime::unparsed();
    };

    let lower = raw.to_lowercase();
    if lower.contains("ago") {
        if let Some(timestamp) = relative_timestamp(&lower, now) {
            return PostTime::at(DateKind::Relative, timestamp);
        }
    }

    absolute_timestamp(raw).map_or_else(PostTime::unparsed, |timestamp| {
        PostTime::at(DateKind::Absolute, timestamp)
    })
}

/// Resolve `"<n><unit> ago"` against `now`.
///
/// Known units are days, hours, weeks and months (30 days). An unknown unit
/// resolves to `now` itself. Returns `None` when no number/unit pair is
/// present or the offset overflows.
#[must_use]
pub fn relative_timestamp(lower: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let caps = RELATIVE_RE.captures(lower)?;
    let value: i64 = caps[1].parse().ok()?;
    let delta = unit_duration(&caps[2], value)?;
    now.checked_sub_signed(delta)
}

fn unit_duration(unit: &str, value: i64) -> Option<Duration> {
    match unit {
        "d" | "day" | "days" => Duration::try_days(value),
        "h" | "hr" | "hrs" | "hour" | "hours" => Duration::try_hours(value),
        "w" | "wk" | "wks" | "week" | "weeks" => Duration::try_weeks(value),
        "mo" | "mos" | "month" | "months" => value.checked_mul(30).and_then(Duration::try_days),
        _ => Some(Duration::zero()),
    }
}

/// Parse an absolute date or date-time. RFC 3339 strings keep the wall time
/// as written; date-only forms resolve to midnight.
#[must_use]
pub fn absolute_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use chrono::Datelike;

    use super::*;

    fn now() -> NaiveDateTime {
        // A Wednesday afternoon.
        NaiveDate::from_ymd_opt(2024, 5, 15)
            .unwrap()
            .and_hms_opt(16, 45, 0)
            .unwrap()
    }

    #[test]
    fn three_days_ago_is_exactly_three_days_earlier() {
        let ts = relative_timestamp("3d ago", now()).unwrap();
        assert_eq!(now() - ts, Duration::days(3));
        assert!(ts <= now());

        let parsed = parse_post_date(Some("3d ago"), now());
        assert_eq!(parsed.kind, DateKind::Relative);
        assert_eq!(parsed.hour, Some(16));
        assert_eq!(parsed.day.as_deref(), Some("Sunday"));
    }

    #[test]
    fn relative_units() {
        let n = now();
        assert_eq!(relative_timestamp("5h ago", n).unwrap(), n - Duration::hours(5));
        assert_eq!(relative_timestamp("2w ago", n).unwrap(), n - Duration::weeks(2));
        assert_eq!(relative_timestamp("1mo ago", n).unwrap(), n - Duration::days(30));
        assert_eq!(relative_timestamp("4 days ago", n).unwrap(), n - Duration::days(4));
    }

    #[test]
    fn unknown_unit_is_zero_duration() {
        assert_eq!(relative_timestamp("7m ago", now()).unwrap(), now());
        assert_eq!(relative_timestamp("1yr ago", now()).unwrap(), now());
    }

    #[test]
    fn relative_match_is_case_insensitive() {
        let parsed = parse_post_date(Some("12H AGO"), now());
        assert_eq!(parsed.kind, DateKind::Relative);
        assert_eq!(parsed.hour, Some(4));
    }

    #[test]
    fn ago_without_number_is_unparsed() {
        assert_eq!(parse_post_date(Some("a while ago"), now()), PostTime::unparsed());
    }

    #[test]
    fn absolute_iso_ignores_now() {
        let later = now() + Duration::days(40);
        let a = parse_post_date(Some("2024-03-05 14:30:00"), now());
        let b = parse_post_date(Some("2024-03-05 14:30:00"), later);
        assert_eq!(a, b);
        assert_eq!(a.kind, DateKind::Absolute);
        assert_eq!(a.hour, Some(14));
        assert_eq!(a.day.as_deref(), Some("Tuesday"));
    }

    #[test]
    fn rfc3339_keeps_written_wall_time() {
        let parsed = parse_post_date(Some("2024-03-05T09:15:00+05:30"), now());
        assert_eq!(parsed.hour, Some(9));
        assert_eq!(parsed.day.as_deref(), Some("Tuesday"));
    }

    #[test]
    fn date_only_is_midnight() {
        let ts = absolute_timestamp("March 5, 2024").unwrap();
        assert_eq!(ts.hour(), 0);
        assert_eq!(ts.day(), 5);
        assert_eq!(parse_post_date(Some("2024-03-05"), now()).hour, Some(0));
    }

    #[test]
    fn garbage_and_missing_are_unparsed() {
        assert_eq!(parse_post_date(Some("2d • Edited •"), now()), PostTime::unparsed());
        assert_eq!(parse_post_date(Some("   "), now()), PostTime::unparsed());
        assert_eq!(parse_post_date(None, now()), PostTime::unparsed());
    }
}
