//! Reviewer feedback on generated posts, kept as a JSON object on disk:
//! `{ "<post_id>": { "<field>": "<text>", ... }, ... }`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::GeneratorError;

/// Feedback fields for one post, keyed by field name.
pub type PostFeedback = BTreeMap<String, String>;

/// All feedback, keyed by post id.
pub type Feedback = BTreeMap<String, PostFeedback>;

/// The free-text fields a reviewer can fill in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackFields {
    pub tone: Option<String>,
    pub cta: Option<String>,
    pub content: Option<String>,
    pub other: Option<String>,
}

impl FeedbackFields {
    /// Non-blank fields only, trimmed.
    #[must_use]
    pub fn into_map(self) -> PostFeedback {
        [
            ("tone", self.tone),
            ("cta", self.cta),
            ("content", self.content),
            ("other", self.other),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            let value = value?.trim().to_string();
            (!value.is_empty()).then(|| (key.to_string(), value))
        })
        .collect()
    }
}

/// File-backed feedback store.
#[derive(Debug, Clone)]
pub struct FeedbackStore {
    path: PathBuf,
}

impl FeedbackStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all feedback.
    ///
    /// A missing file is an empty store. An unreadable file or one that does
    /// not hold a JSON object of string fields is logged and also treated as
    /// empty.
    #[must_use]
    pub fn load(&self) -> Feedback {
        if !self.path.exists() {
            return Feedback::new();
        }
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "could not read feedback file");
                return Feedback::new();
            }
        };
        match serde_json::from_str::<Feedback>(&raw) {
            Ok(feedback) => feedback,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "feedback file is not a JSON object of feedback fields; starting empty"
                );
                Feedback::new()
            }
        }
    }

    /// Overwrite the store with `feedback`, creating the parent directory.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::Io`] or [`GeneratorError::Json`] if the file
    /// cannot be written.
    pub fn save(&self, feedback: &Feedback) -> Result<(), GeneratorError> {
        postlens_core::storage::ensure_parent(&self.path)?;
        let json = serde_json::to_string_pretty(feedback).map_err(|source| GeneratorError::Json {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, json).map_err(|source| GeneratorError::Io {
            path: self.path.clone(),
            source,
        })?;
        tracing::info!(path = %self.path.display(), posts = feedback.len(), "saved feedback");
        Ok(())
    }

    /// Replace the feedback for `post_id`, save, and return the merged store.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::InvalidFeedback`] if `post_id` is blank or
    /// `fields` is empty, or a write error from [`FeedbackStore::save`].
    pub fn apply(&self, post_id: &str, fields: PostFeedback) -> Result<Feedback, GeneratorError> {
        let post_id = post_id.trim();
        if post_id.is_empty() {
            return Err(GeneratorError::InvalidFeedback("post id is empty".to_string()));
        }
        if fields.is_empty() {
            return Err(GeneratorError::InvalidFeedback(format!(
                "no feedback fields given for {post_id}"
            )));
        }

        let mut feedback = self.load();
        feedback.insert(post_id.to_string(), fields);
        self.save(&feedback)?;
        tracing::info!(post_id, "applied feedback");
        Ok(feedback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> PostFeedback {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn into_map_drops_blank_fields() {
        let map = FeedbackFields {
            tone: Some(" warmer ".to_string()),
            cta: Some("   ".to_string()),
            content: None,
            other: Some("shorter".to_string()),
        }
        .into_map();
        assert_eq!(map, fields(&[("tone", "warmer"), ("other", "shorter")]));
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FeedbackStore::new(dir.path().join("feedback.json"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn invalid_or_non_object_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedback.json");

        std::fs::write(&path, "{not json").unwrap();
        assert!(FeedbackStore::new(&path).load().is_empty());

        std::fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(FeedbackStore::new(&path).load().is_empty());
    }

    #[test]
    fn apply_upserts_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = FeedbackStore::new(dir.path().join("nested").join("feedback.json"));

        store
            .apply("post_trend_1_20240515_164500", fields(&[("tone", "warmer")]))
            .unwrap();
        store
            .apply("post_trend_2_20240515_164500", fields(&[("cta", "softer")]))
            .unwrap();
        let merged = store
            .apply("post_trend_1_20240515_164500", fields(&[("content", "more data")]))
            .unwrap();

        assert_eq!(merged.len(), 2);
        assert_eq!(
            merged["post_trend_1_20240515_164500"],
            fields(&[("content", "more data")])
        );
        assert_eq!(store.load(), merged);
    }

    #[test]
    fn apply_rejects_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let store = FeedbackStore::new(dir.path().join("feedback.json"));

        assert!(matches!(
            store.apply("  ", fields(&[("tone", "x")])),
            Err(GeneratorError::InvalidFeedback(_))
        ));
        assert!(matches!(
            store.apply("post_1", PostFeedback::new()),
            Err(GeneratorError::InvalidFeedback(_))
        ));
        assert!(!store.path().exists());
    }
}
