use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("invalid CSS selector \"{selector}\": {reason}")]
    Selector { selector: String, reason: String },

    #[error("invalid profile URL \"{url}\": {reason}")]
    InvalidProfileUrl { url: String, reason: String },

    #[error("failed to serialize hashtags: {0}")]
    Hashtags(#[from] serde_json::Error),
}
