//! The trend summary: grouped mean-engagement tables plus hashtag counts.
//!
//! On disk each table is one `(metric, value)` row whose value is the JSON
//! encoding of the table. Decoding is schema-driven: every metric name maps
//! to exactly one [`TrendTable`] variant, and anything else is rejected.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::post::{CtaPresence, LengthBucket, Tone};

/// One entry of a top-hashtag table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: u64,
}

/// Names of the metrics in a [`TrendSummary`], in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    ByHour,
    ByDay,
    ByTone,
    ByHasCta,
    ByLength,
    TopHashtags,
    ByTopic,
    ByProfile,
    FocusTopHashtags,
    FocusTopTopics,
}

impl Metric {
    pub const ALL: [Metric; 10] = [
        Metric::ByHour,
        Metric::ByDay,
        Metric::ByTone,
        Metric::ByHasCta,
        Metric::ByLength,
        Metric::TopHashtags,
        Metric::ByTopic,
        Metric::ByProfile,
        Metric::FocusTopHashtags,
        Metric::FocusTopTopics,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Metric::ByHour => "avg_engagement_by_hour",
            Metric::ByDay => "avg_engagement_by_day",
            Metric::ByTone => "avg_engagement_by_tone",
            Metric::ByHasCta => "avg_engagement_by_has_cta",
            Metric::ByLength => "avg_engagement_by_length",
            Metric::TopHashtags => "top_hashtags",
            Metric::ByTopic => "avg_engagement_by_topic",
            Metric::ByProfile => "avg_engagement_by_profile",
            Metric::FocusTopHashtags => "focus_top_hashtags",
            Metric::FocusTopTopics => "focus_top_topics",
        }
    }

    /// Decode a serialized table using this metric's schema.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidMetric`] if `raw` does not match the
    /// shape this metric stores.
    pub fn decode(self, raw: &str) -> Result<TrendTable, StorageError> {
        let wrap = |source| StorageError::InvalidMetric {
            metric: self.name().to_string(),
            source,
        };
        let table = match self {
            Metric::ByHour => TrendTable::ByHour(serde_json::from_str(raw).map_err(wrap)?),
            Metric::ByDay => TrendTable::ByDay(serde_json::from_str(raw).map_err(wrap)?),
            Metric::ByTone => TrendTable::ByTone(serde_json::from_str(raw).map_err(wrap)?),
            Metric::ByHasCta => TrendTable::ByCta(serde_json::from_str(raw).map_err(wrap)?),
            Metric::ByLength => TrendTable::ByLength(serde_json::from_str(raw).map_err(wrap)?),
            Metric::ByTopic | Metric::ByProfile | Metric::FocusTopTopics => {
                TrendTable::ByKey(serde_json::from_str(raw).map_err(wrap)?)
            }
            Metric::TopHashtags | Metric::FocusTopHashtags => {
                TrendTable::TagCounts(serde_json::from_str(raw).map_err(wrap)?)
            }
        };
        Ok(table)
    }
}

impl FromStr for Metric {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| StorageError::UnknownMetric(s.to_string()))
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A single aggregate, tagged by its key type.
#[derive(Debug, Clone, PartialEq)]
pub enum TrendTable {
    ByHour(BTreeMap<u8, f64>),
    ByDay(BTreeMap<String, f64>),
    ByTone(BTreeMap<Tone, f64>),
    ByCta(BTreeMap<CtaPresence, f64>),
    ByLength(BTreeMap<LengthBucket, f64>),
    /// Free-form string keys: topic labels or profile identifiers.
    ByKey(BTreeMap<String, f64>),
    /// Ordered most-frequent first.
    TagCounts(Vec<TagCount>),
}

impl TrendTable {
    /// # Errors
    ///
    /// Only fails if a value cannot be represented in JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        match self {
            TrendTable::ByHour(t) => serde_json::to_string(t),
            TrendTable::ByDay(t) | TrendTable::ByKey(t) => serde_json::to_string(t),
            TrendTable::ByTone(t) => serde_json::to_string(t),
            TrendTable::ByCta(t) => serde_json::to_string(t),
            TrendTable::ByLength(t) => serde_json::to_string(t),
            TrendTable::TagCounts(t) => serde_json::to_string(t),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            TrendTable::ByHour(t) => t.is_empty(),
            TrendTable::ByDay(t) | TrendTable::ByKey(t) => t.is_empty(),
            TrendTable::ByTone(t) => t.is_empty(),
            TrendTable::ByCta(t) => t.is_empty(),
            TrendTable::ByLength(t) => t.is_empty(),
            TrendTable::TagCounts(t) => t.is_empty(),
        }
    }
}

/// Every table the aggregator produces. Means are rounded to 2 decimals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrendSummary {
    pub avg_engagement_by_hour: BTreeMap<u8, f64>,
    pub avg_engagement_by_day: BTreeMap<String, f64>,
    pub avg_engagement_by_tone: BTreeMap<Tone, f64>,
    pub avg_engagement_by_has_cta: BTreeMap<CtaPresence, f64>,
    pub avg_engagement_by_length: BTreeMap<LengthBucket, f64>,
    pub top_hashtags: Vec<TagCount>,
    pub avg_engagement_by_topic: BTreeMap<String, f64>,
    pub avg_engagement_by_profile: BTreeMap<String, f64>,
    /// Top hashtags of the configured focus profile.
    pub focus_top_hashtags: Vec<TagCount>,
    /// Mean engagement by topic label for the configured focus profile.
    pub focus_top_topics: BTreeMap<String, f64>,
}

impl TrendSummary {
    /// Returns the table stored under `metric`.
    #[must_use]
    pub fn table(&self, metric: Metric) -> TrendTable {
        match metric {
            Metric::ByHour => TrendTable::ByHour(self.avg_engagement_by_hour.clone()),
            Metric::ByDay => TrendTable::ByDay(self.avg_engagement_by_day.clone()),
            Metric::ByTone => TrendTable::ByTone(self.avg_engagement_by_tone.clone()),
            Metric::ByHasCta => TrendTable::ByCta(self.avg_engagement_by_has_cta.clone()),
            Metric::ByLength => TrendTable::ByLength(self.avg_engagement_by_length.clone()),
            Metric::TopHashtags => TrendTable::TagCounts(self.top_hashtags.clone()),
            Metric::ByTopic => TrendTable::ByKey(self.avg_engagement_by_topic.clone()),
            Metric::ByProfile => TrendTable::ByKey(self.avg_engagement_by_profile.clone()),
            Metric::FocusTopHashtags => TrendTable::TagCounts(self.focus_top_hashtags.clone()),
            Metric::FocusTopTopics => TrendTable::ByKey(self.focus_top_topics.clone()),
        }
    }

    /// All metrics paired with their tables, in [`Metric::ALL`] order.
    #[must_use]
    pub fn entries(&self) -> Vec<(Metric, TrendTable)> {
        Metric::ALL.into_iter().map(|m| (m, self.table(m))).collect()
    }

    /// Store `table` under `metric`. Pairs produced by [`Metric::decode`]
    /// always match; a mismatched pair is left unapplied and reported.
    ///
    /// Returns `false` if the table variant does not belong to `metric`.
    pub fn set(&mut self, metric: Metric, table: TrendTable) -> bool {
        match (metric, table) {
            (Metric::ByHour, TrendTable::ByHour(t)) => self.avg_engagement_by_hour = t,
            (Metric::ByDay, TrendTable::ByDay(t)) => self.avg_engagement_by_day = t,
            (Metric::ByTone, TrendTable::ByTone(t)) => self.avg_engagement_by_tone = t,
            (Metric::ByHasCta, TrendTable::ByCta(t)) => self.avg_engagement_by_has_cta = t,
            (Metric::ByLength, TrendTable::ByLength(t)) => self.avg_engagement_by_length = t,
            (Metric::TopHashtags, TrendTable::TagCounts(t)) => self.top_hashtags = t,
            (Metric::ByTopic, TrendTable::ByKey(t)) => self.avg_engagement_by_topic = t,
            (Metric::ByProfile, TrendTable::ByKey(t)) => self.avg_engagement_by_profile = t,
            (Metric::FocusTopHashtags, TrendTable::TagCounts(t)) => self.focus_top_hashtags = t,
            (Metric::FocusTopTopics, TrendTable::ByKey(t)) => self.focus_top_topics = t,
            _ => return false,
        }
        true
    }

    /// `true` when no table holds any entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().iter().all(|(_, t)| t.is_empty())
    }
}
