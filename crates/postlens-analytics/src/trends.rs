//! Grouped mean-engagement tables over enriched posts.

use std::collections::{BTreeMap, HashMap};

use postlens_core::{CtaPresence, DateKind, EnrichedPost, TagCount, TrendSummary};

/// Number of entries in a top-hashtag table.
pub const TOP_HASHTAGS: usize = 5;

/// Aggregation knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendOptions {
    /// Profile whose hashtags and topics get their own tables. `None`
    /// leaves both focus tables empty.
    pub focus_profile: Option<String>,
    /// When `false`, posts dated relative to the analysis time ("3d ago")
    /// are left out of the hour and weekday tables.
    pub include_relative_dates: bool,
}

impl Default for TrendOptions {
    fn default() -> Self {
        Self {
            focus_profile: None,
            include_relative_dates: true,
        }
    }
}

/// Build every trend table from `posts`.
///
/// Posts with no hour/day are excluded from the hour/day tables, and posts
/// with no length bucket (empty text) from the length table. An empty input
/// produces an empty summary.
#[must_use]
pub fn aggregate_trends(posts: &[EnrichedPost], options: &TrendOptions) -> TrendSummary {
    let dated = |p: &EnrichedPost| options.include_relative_dates || p.date_kind != DateKind::Relative;

    let focus: Vec<&EnrichedPost> = match options.focus_profile.as_deref() {
        Some(profile) => posts.iter().filter(|p| p.profile == profile).collect(),
        None => Vec::new(),
    };

    let summary = TrendSummary {
        avg_engagement_by_hour: mean_by(posts, |p| p.post_hour.filter(|_| dated(p))),
        avg_engagement_by_day: mean_by(posts, |p| p.post_day.clone().filter(|_| dated(p))),
        avg_engagement_by_tone: mean_by(posts, |p| Some(p.tone)),
        avg_engagement_by_has_cta: mean_by(posts, |p| Some(CtaPresence::from(p.has_cta))),
        avg_engagement_by_length: mean_by(posts, EnrichedPost::length_bucket),
        top_hashtags: top_hashtags(posts),
        avg_engagement_by_topic: mean_by(posts, |p| Some(p.topic_label.clone())),
        avg_engagement_by_profile: mean_by(posts, |p| Some(p.profile.clone())),
        focus_top_hashtags: top_hashtags(focus.iter().copied()),
        focus_top_topics: mean_by(focus.iter().copied(), |p| Some(p.topic_label.clone())),
    };

    tracing::info!(
        posts = posts.len(),
        focus_posts = focus.len(),
        profiles = summary.avg_engagement_by_profile.len(),
        "aggregated engagement trends"
    );
    summary
}

/// Mean total engagement per key, rounded to 2 decimals. Rows whose key is
/// `None` are skipped.
pub fn mean_by<'a, K, I, F>(posts: I, key: F) -> BTreeMap<K, f64>
where
    K: Ord,
    I: IntoIterator<Item = &'a EnrichedPost>,
    F: Fn(&EnrichedPost) -> Option<K>,
{
    let mut groups: BTreeMap<K, (u64, u64)> = BTreeMap::new();
    for post in posts {
        if let Some(k) = key(post) {
            let (sum, count) = groups.entry(k).or_insert((0, 0));
            *sum = sum.saturating_add(post.total_engagement);
            *count += 1;
        }
    }
    groups
        .into_iter()
        .map(|(k, (sum, count))| {
            #[allow(clippy::cast_precision_loss)]
            let mean = sum as f64 / count as f64;
            (k, round2(mean))
        })
        .collect()
}

/// The [`TOP_HASHTAGS`] most frequent tags; equal counts keep first-seen
/// order.
pub fn top_hashtags<'a>(posts: impl IntoIterator<Item = &'a EnrichedPost>) -> Vec<TagCount> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for tag in posts.into_iter().flat_map(|p| p.hashtags.iter()) {
        let count = counts.entry(tag.as_str()).or_insert(0);
        if *count == 0 {
            order.push(tag.as_str());
        }
        *count += 1;
    }

    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order
        .into_iter()
        .take(TOP_HASHTAGS)
        .map(|tag| TagCount {
            tag: tag.to_string(),
            count: counts[tag],
        })
        .collect()
}

/// Round to 2 decimals, sending exact halves to the even neighbour.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
#[path = "trends_test.rs"]
mod tests;
