use postlens_core::AppConfig;

use crate::trends::TrendOptions;

/// Parameters for one analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisSettings {
    /// Length of the zero vector substituted for blank texts; model vectors
    /// must match it.
    pub embedding_dim: usize,
    pub cluster_count: usize,
    pub cluster_seed: u64,
    pub trends: TrendOptions,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            embedding_dim: 384,
            cluster_count: 5,
            cluster_seed: 42,
            trends: TrendOptions::default(),
        }
    }
}

impl AnalysisSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            embedding_dim: config.embedding_dim,
            cluster_count: config.cluster_count,
            cluster_seed: config.cluster_seed,
            trends: TrendOptions {
                focus_profile: config.focus_profile.clone(),
                include_relative_dates: config.include_relative_dates,
            },
        }
    }
}
