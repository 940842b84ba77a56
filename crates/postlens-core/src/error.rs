use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Errors raised while reading or writing the tabular files.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The input file does not exist. Fatal for the caller.
    #[error("{} not found", path.display())]
    MissingInput { path: PathBuf },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("unknown trend metric \"{0}\"")]
    UnknownMetric(String),

    #[error("invalid value for trend metric {metric}: {source}")]
    InvalidMetric {
        metric: String,
        #[source]
        source: serde_json::Error,
    },
}
