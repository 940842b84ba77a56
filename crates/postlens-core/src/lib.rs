//! Shared model, tabular storage and configuration for postlens.

mod app_config;
mod config;
pub mod error;
pub mod post;
pub mod storage;
pub mod trends;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, StorageError};
pub use post::{CtaPresence, DateKind, EnrichedPost, LengthBucket, RawPost, Tone};
pub use trends::{Metric, TagCount, TrendSummary, TrendTable};
