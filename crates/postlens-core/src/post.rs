//! Post records: the raw rows the scraper emits and the enriched rows the
//! analytics pipeline persists.

use serde::{Deserialize, Serialize};

/// One row of the ingestion table, exactly as the scraper wrote it.
///
/// Every column is optional. Counts stay textual here; coercion happens in
/// the normalizer so that defaulted values can be reported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPost {
    pub profile: Option<String>,
    pub text: Option<String>,
    /// Serialized list of hashtags (JSON array or Python list literal).
    pub hashtags: Option<String>,
    pub date: Option<String>,
    pub likes: Option<String>,
    pub comments: Option<String>,
    pub shares: Option<String>,
}

/// Categorical sentiment bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Negative,
    Neutral,
    Positive,
}

impl Tone {
    /// Scores strictly above `0.3` are positive, strictly below `-0.3`
    /// negative, everything else (boundaries included) neutral.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score > 0.3 {
            Tone::Positive
        } else if score < -0.3 {
            Tone::Negative
        } else {
            Tone::Neutral
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Negative => "negative",
            Tone::Neutral => "neutral",
            Tone::Positive => "positive",
        }
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Post length bucket over character counts: `(0,100]`, `(100,500]`,
/// `(500,1000]`, `(1000,∞)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LengthBucket {
    #[serde(rename = "short")]
    Short,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "long")]
    Long,
    #[serde(rename = "very long")]
    VeryLong,
}

impl LengthBucket {
    /// Returns `None` for zero-length posts, which fall outside every bucket.
    #[must_use]
    pub fn from_length(length: usize) -> Option<Self> {
        match length {
            0 => None,
            1..=100 => Some(LengthBucket::Short),
            101..=500 => Some(LengthBucket::Medium),
            501..=1000 => Some(LengthBucket::Long),
            _ => Some(LengthBucket::VeryLong),
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            LengthBucket::Short => "short",
            LengthBucket::Medium => "medium",
            LengthBucket::Long => "long",
            LengthBucket::VeryLong => "very long",
        }
    }
}

/// Grouping key for the call-to-action table. Serialized as `"true"` /
/// `"false"` so JSON object keys stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CtaPresence {
    #[serde(rename = "false")]
    Without,
    #[serde(rename = "true")]
    With,
}

impl From<bool> for CtaPresence {
    fn from(has_cta: bool) -> Self {
        if has_cta {
            CtaPresence::With
        } else {
            CtaPresence::Without
        }
    }
}

/// How the raw date string was interpreted.
///
/// `Relative` rows ("3d ago") are anchored to the wall clock at analysis
/// time, so their hour/day differ between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateKind {
    Relative,
    Absolute,
    Unparsed,
}

/// A fully enriched post as persisted to `posts_analyzed.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedPost {
    pub profile: String,
    pub text: String,
    #[serde(with = "hashtag_cell")]
    pub hashtags: Vec<String>,
    pub date: String,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub date_kind: DateKind,
    /// 0–23, absent when the date could not be parsed.
    pub post_hour: Option<u8>,
    /// Full weekday name, absent when the date could not be parsed.
    pub post_day: Option<String>,
    /// Character count of the cleaned text.
    pub length: usize,
    pub num_hashtags: usize,
    pub sentiment: f64,
    pub tone: Tone,
    pub has_cta: bool,
    pub topic_cluster: usize,
    pub topic_label: String,
    pub total_engagement: u64,
}

impl EnrichedPost {
    #[must_use]
    pub fn length_bucket(&self) -> Option<LengthBucket> {
        LengthBucket::from_length(self.length)
    }
}

/// Hashtag lists live in a single CSV cell as a JSON array.
pub mod hashtag_cell {
    use serde::{de::Error as _, ser::Error as _, Deserialize, Deserializer, Serializer};

    /// # Errors
    ///
    /// Propagates the serializer's error.
    pub fn serialize<S: Serializer>(tags: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = serde_json::to_string(tags).map_err(S::Error::custom)?;
        serializer.serialize_str(&encoded)
    }

    /// # Errors
    ///
    /// Fails when the cell is not a JSON array of strings.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).map_err(D::Error::custom)
    }
}
