//! Binary sentiment classification.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;

/// Top label returned by a sentiment model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Prediction {
    pub label: String,
    /// Confidence in `[0, 1]` for `label`.
    pub score: f64,
}

impl Prediction {
    /// Positive confidence for a `POSITIVE` label, negated otherwise.
    #[must_use]
    pub fn signed_score(&self) -> f64 {
        if self.label.eq_ignore_ascii_case("positive") {
            self.score
        } else {
            -self.score
        }
    }
}

/// A sentiment model that labels one text at a time.
pub trait SentimentClassifier {
    fn classify(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Prediction, AnalyticsError>> + Send;
}

/// TEI `/predict` client for a sequence-classification model.
pub struct TeiClassifier {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    inputs: &'a str,
    truncate: bool,
}

impl TeiClassifier {
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
            url: format!("{}/predict", tei_url.trim_end_matches('/')),
        })
    }
}

impl SentimentClassifier for TeiClassifier {
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Tei`] if the request fails, the server
    /// answers with a non-success status, or no label comes back.
    async fn classify(&self, text: &str) -> Result<Prediction, AnalyticsError> {
        let request = PredictRequest {
            inputs: text,
            truncate: true,
        };
        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalyticsError::Tei(format!("TEI predict request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AnalyticsError::Tei(format!(
                "TEI predict returned status {}",
                response.status()
            )));
        }

        let predictions: Vec<Prediction> = response
            .json()
            .await
            .map_err(|e| AnalyticsError::Tei(format!("TEI predict response parse error: {e}")))?;

        predictions
            .into_iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .ok_or_else(|| AnalyticsError::Tei("TEI predict returned no labels".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_score_keeps_positive() {
        let p = Prediction {
            label: "POSITIVE".to_string(),
            score: 0.98,
        };
        assert!((p.signed_score() - 0.98).abs() < f64::EPSILON);
    }

    #[test]
    fn signed_score_negates_negative() {
        let p = Prediction {
            label: "NEGATIVE".to_string(),
            score: 0.75,
        };
        assert!((p.signed_score() + 0.75).abs() < f64::EPSILON);
    }
}
