use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by the chat client, the feedback store and post export.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Network or TLS failure, or a non-2xx status from the chat API.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The chat API answered without usable content.
    #[error("chat API error: {0}")]
    Api(String),

    #[error("no API key configured (set GROQ_API_KEY)")]
    MissingApiKey,

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid feedback: {0}")]
    InvalidFeedback(String),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error at {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV error at {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    Storage(#[from] postlens_core::StorageError),
}
