//! Sentence embeddings for topic clustering.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;

use crate::error::AnalyticsError;

/// Maximum number of texts per /embed call.
const BATCH_SIZE: usize = 64;

/// A sentence-embedding model.
///
/// Implementations return one mean-pooled vector per input, in input order.
pub trait Embedder {
    fn embed(
        &self,
        texts: &[&str],
    ) -> impl Future<Output = Result<Vec<Vec<f32>>, AnalyticsError>> + Send;
}

/// TEI (Text Embeddings Inference) `/embed` client.
pub struct TeiEmbedder {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a [&'a str],
    truncate: bool,
    /// TEI L2-normalizes unless this is `false`.
    normalize: bool,
}

impl TeiEmbedder {
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(tei_url: &str, timeout_secs: u64) -> Result<Self, AnalyticsError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: format!("{}/embed", tei_url.trim_end_matches('/')),
        })
    }
}

impl Embedder for TeiEmbedder {
    /// Texts are sent in groups of [`BATCH_SIZE`] (64) per request.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Tei`] if a request fails, the server answers
    /// with a non-success status, or the response cannot be parsed.
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, AnalyticsError> {
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(BATCH_SIZE) {
            let request = EmbedRequest {
                inputs: chunk,
                truncate: true,
                normalize: false,
            };
            let response = self
                .client
                .post(&self.url)
                .json(&request)
                .send()
                .await
                .map_err(|e| AnalyticsError::Tei(format!("TEI embed request failed: {e}")))?;

            if !response.status().is_success() {
                return Err(AnalyticsError::Tei(format!(
                    "TEI embed returned status {}",
                    response.status()
                )));
            }

            let embeddings: Vec<Vec<f32>> = response
                .json()
                .await
                .map_err(|e| AnalyticsError::Tei(format!("TEI embed response parse error: {e}")))?;

            if embeddings.len() != chunk.len() {
                return Err(AnalyticsError::Tei(format!(
                    "TEI returned {} embeddings for {} inputs",
                    embeddings.len(),
                    chunk.len()
                )));
            }

            all_embeddings.extend(embeddings);
        }

        Ok(all_embeddings)
    }
}

/// Embed every post text, substituting a zero vector of length `dim` for
/// blank texts without sending them to the model.
///
/// # Errors
///
/// Propagates model failures, and returns [`AnalyticsError::EmbeddingShape`]
/// if the model returns the wrong number of vectors or a vector whose length
/// is not `dim`.
pub async fn embed_posts<E: Embedder>(
    embedder: &E,
    texts: &[&str],
    dim: usize,
) -> Result<Vec<Vec<f32>>, AnalyticsError> {
    let non_empty: Vec<&str> = texts
        .iter()
        .copied()
        .filter(|t| !t.trim().is_empty())
        .collect();

    tracing::info!(
        posts = texts.len(),
        embedded = non_empty.len(),
        "generating embeddings"
    );

    let embedded = if non_empty.is_empty() {
        Vec::new()
    } else {
        embedder.embed(&non_empty).await?
    };
    if embedded.len() != non_empty.len() {
        return Err(AnalyticsError::EmbeddingShape(format!(
            "expected {} embeddings, got {}",
            non_empty.len(),
            embedded.len()
        )));
    }
    if let Some(bad) = embedded.iter().find(|v| v.len() != dim) {
        return Err(AnalyticsError::EmbeddingShape(format!(
            "expected dimension {dim}, got {}",
            bad.len()
        )));
    }

    let mut model_vectors = embedded.into_iter();
    let vectors = texts
        .iter()
        .map(|t| {
            if t.trim().is_empty() {
                vec![0.0; dim]
            } else {
                model_vectors.next().unwrap_or_else(|| vec![0.0; dim])
            }
        })
        .collect();
    Ok(vectors)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct RecordingEmbedder {
        seen: Mutex<Vec<String>>,
        dim: usize,
    }

    impl Embedder for RecordingEmbedder {
        async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, AnalyticsError> {
            self.seen
                .lock()
                .unwrap()
                .extend(texts.iter().map(|t| (*t).to_owned()));
            #[allow(clippy::cast_precision_loss)]
            let vectors = texts.iter().map(|t| vec![t.len() as f32; self.dim]).collect();
            Ok(vectors)
        }
    }

    #[tokio::test]
    async fn blank_texts_get_zero_vectors_without_model_call() {
        let embedder = RecordingEmbedder {
            seen: Mutex::new(Vec::new()),
            dim: 3,
        };
        let vectors = embed_posts(&embedder, &["ab", "", "   ", "abcd"], 3)
            .await
            .unwrap();

        assert_eq!(
            vectors,
            vec![
                vec![2.0, 2.0, 2.0],
                vec![0.0; 3],
                vec![0.0; 3],
                vec![4.0, 4.0, 4.0],
            ]
        );
        assert_eq!(*embedder.seen.lock().unwrap(), vec!["ab", "abcd"]);
    }

    #[tokio::test]
    async fn all_blank_skips_the_model() {
        let embedder = RecordingEmbedder {
            seen: Mutex::new(Vec::new()),
            dim: 2,
        };
        let vectors = embed_posts(&embedder, &["", ""], 2).await.unwrap();
        assert_eq!(vectors, vec![vec![0.0; 2]; 2]);
        assert!(embedder.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn wrong_dimension_is_rejected() {
        let embedder = RecordingEmbedder {
            seen: Mutex::new(Vec::new()),
            dim: 4,
        };
        let err = embed_posts(&embedder, &["text"], 384).await.unwrap_err();
        assert!(matches!(err, AnalyticsError::EmbeddingShape(_)));
    }
}
