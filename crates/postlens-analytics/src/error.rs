use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TEI error: {0}")]
    Tei(String),

    #[error("clustering error: {0}")]
    Clustering(String),

    #[error("embedding shape error: {0}")]
    EmbeddingShape(String),
}
