//! Engagement analytics for scraped posts.
//!
//! Normalizes raw rows (dedup, dates, hashtags, counts), extracts per-post
//! features (sentiment via a TEI classifier, call-to-action phrases, topic
//! clusters over TEI embeddings) and aggregates mean engagement into a
//! [`postlens_core::TrendSummary`]. Stages run strictly in sequence.

pub mod classifier;
pub mod cluster;
pub mod dates;
pub mod embeddings;
pub mod error;
pub mod features;
pub mod normalize;
pub mod pipeline;
pub mod topics;
pub mod trends;
pub mod types;

pub use classifier::{Prediction, SentimentClassifier, TeiClassifier};
pub use cluster::KMeans;
pub use embeddings::{Embedder, TeiEmbedder};
pub use error::AnalyticsError;
pub use normalize::{normalize_posts, NormalizeReport, NormalizedPost};
pub use pipeline::{run_analysis, AnalysisOutput};
pub use trends::{aggregate_trends, TrendOptions};
pub use types::AnalysisSettings;
