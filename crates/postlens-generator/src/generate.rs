//! Drafting posts from the trend summary and repairing the model's replies.

use std::path::Path;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use postlens_core::TrendSummary;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::client::ChatClient;
use crate::error::GeneratorError;
use crate::feedback::Feedback;
use crate::prompt::{build_prompt, suggested_hour};

static CODE_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^```json\s*|\s*```$").expect("valid regex"));

const INVALID_JSON_EXPLANATION: &str =
    "Error: LLM did not return valid JSON conforming to structure.";
const MISSING_KEYS_EXPLANATION: &str = "Error: JSON structure invalid (missing keys).";
const MISSING_KEYS_ERROR: &str = "Parsed JSON missing required keys ('post_text', 'explanation')";

/// One drafted post as written to `generated_posts.csv`.
///
/// Field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedPost {
    pub post_id: String,
    pub post_text: Option<String>,
    pub explanation: Option<String>,
    pub generated_at: String,
    pub suggested_posting_day: String,
    pub suggested_posting_hour: u8,
    /// Set when the API call failed or the reply had to be repaired.
    pub error: Option<String>,
}

/// A model reply after repair.
///
/// When the reply is not the expected JSON object, `post_text` holds the raw
/// reply, `explanation` says what went wrong and `error` carries the detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostReply {
    pub post_text: String,
    pub explanation: String,
    pub error: Option<String>,
}

/// Extract `post_text` and `explanation` from a model reply.
///
/// Strips ```` ```json ```` fences and parses the span from the first `{` to
/// the last `}`. Both keys must be present; a non-string value is kept as
/// its JSON text.
#[must_use]
pub fn parse_post_response(raw: &str) -> PostReply {
    let cleaned = CODE_FENCE_RE.replace_all(raw, "");
    let cleaned = cleaned.trim();
    let candidate = match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(start), Some(end)) if start <= end => &cleaned[start..=end],
        _ => cleaned,
    };

    let value: serde_json::Value = match serde_json::from_str(candidate) {
        Ok(value) => value,
        Err(e) => {
            tracing::error!(error = %e, "model reply is not valid JSON");
            return PostReply {
                post_text: raw.to_string(),
                explanation: INVALID_JSON_EXPLANATION.to_string(),
                error: Some(format!("JSON Parsing Error: {e}")),
            };
        }
    };

    let field = |key: &str| {
        value.get(key).map(|v| match v {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        })
    };
    match (field("post_text"), field("explanation")) {
        (Some(post_text), Some(explanation)) => PostReply {
            post_text,
            explanation,
            error: None,
        },
        _ => {
            tracing::error!("model reply is missing post_text or explanation");
            PostReply {
                post_text: raw.to_string(),
                explanation: MISSING_KEYS_EXPLANATION.to_string(),
                error: Some(MISSING_KEYS_ERROR.to_string()),
            }
        }
    }
}

/// Draft `count` posts, one completion each, in sequence.
///
/// Every post shares the prompt, suggested day and suggested hour. A failed
/// completion does not stop the batch: the post is kept with its `error` set.
pub async fn generate_posts(
    client: &ChatClient,
    trends: &TrendSummary,
    feedback: &Feedback,
    author: &str,
    count: usize,
    now: NaiveDateTime,
) -> Vec<GeneratedPost> {
    let prompt = build_prompt(trends, feedback, author);
    let day = prompt.suggested_day().to_string();
    let hour = suggested_hour(trends);
    let stamp = now.format("%Y%m%d_%H%M%S").to_string();
    let generated_at = now.format("%Y-%m-%dT%H:%M:%S%.6f").to_string();

    let mut posts = Vec::with_capacity(count);
    for i in 1..=count {
        tracing::info!(post = i, count, model = client.model(), "requesting completion");
        let mut post = GeneratedPost {
            post_id: format!("post_trend_{i}_{stamp}"),
            post_text: None,
            explanation: None,
            generated_at: generated_at.clone(),
            suggested_posting_day: day.clone(),
            suggested_posting_hour: hour,
            error: None,
        };

        match client.complete(&prompt.text).await {
            Ok(raw) => {
                let reply = parse_post_response(&raw);
                post.post_text = Some(reply.post_text);
                post.explanation = Some(reply.explanation);
                post.error = reply.error;
            }
            Err(e) => {
                tracing::error!(post = i, error = %e, "completion failed");
                post.explanation = Some(format!("Error during generation: {e}"));
                post.error = Some(format!("API Error: {e}"));
            }
        }
        posts.push(post);
    }
    posts
}

/// Write generated posts to `path`, replacing the file.
///
/// An empty slice leaves the file untouched.
///
/// # Errors
///
/// Returns [`GeneratorError::Storage`] if the parent directory cannot be
/// created, or [`GeneratorError::Csv`] / [`GeneratorError::Io`] on write
/// failure.
pub fn save_posts(path: &Path, posts: &[GeneratedPost]) -> Result<(), GeneratorError> {
    if posts.is_empty() {
        tracing::warn!("no posts to save");
        return Ok(());
    }
    postlens_core::storage::ensure_parent(path)?;
    let csv_err = |source: csv::Error| GeneratorError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    for post in posts {
        writer.serialize(post).map_err(csv_err)?;
    }
    writer.flush().map_err(|source| GeneratorError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), posts = posts.len(), "saved generated posts");
    Ok(())
}
