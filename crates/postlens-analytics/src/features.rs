//! Per-post features: length, call-to-action flag and sentiment.

use std::sync::LazyLock;

use postlens_core::Tone;
use regex::Regex;

use crate::classifier::SentimentClassifier;
use crate::error::AnalyticsError;

/// Sentiment input is cut to this many characters.
pub const SENTIMENT_MAX_CHARS: usize = 512;

static CTA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(learn more|comment below|check out|join us|click here|dm me|rsvp|apply now)",
    )
    .expect("valid regex")
});

/// Whether `text` contains one of the call-to-action phrases.
#[must_use]
pub fn has_cta(text: &str) -> bool {
    CTA_RE.is_match(text)
}

/// Character count, not bytes.
#[must_use]
pub fn text_length(text: &str) -> usize {
    text.chars().count()
}

/// Score `text` with `classifier` and bucket it into a [`Tone`].
///
/// Blank text scores `0.0` / neutral and the model is not called.
///
/// # Errors
///
/// Propagates classifier failures.
pub async fn score_sentiment<C: SentimentClassifier>(
    classifier: &C,
    text: &str,
) -> Result<(f64, Tone), AnalyticsError> {
    if text.trim().is_empty() {
        return Ok((0.0, Tone::Neutral));
    }
    let input = truncate_chars(text, SENTIMENT_MAX_CHARS);
    let score = classifier.classify(input).await?.signed_score();
    Ok((score, Tone::from_score(score)))
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::classifier::Prediction;

    struct FixedClassifier {
        label: &'static str,
        score: f64,
        calls: Mutex<Vec<String>>,
    }

    impl FixedClassifier {
        fn new(label: &'static str, score: f64) -> Self {
            Self {
                label,
                score,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl SentimentClassifier for FixedClassifier {
        async fn classify(&self, text: &str) -> Result<Prediction, AnalyticsError> {
            self.calls.lock().unwrap().push(text.to_owned());
            Ok(Prediction {
                label: self.label.to_owned(),
                score: self.score,
            })
        }
    }

    #[test]
    fn cta_detection_is_case_insensitive() {
        assert!(has_cta("DM me for details"));
        assert!(has_cta("Please RSVP by Friday"));
        assert!(has_cta("check OUT the new release"));
    }

    #[test]
    fn cta_absent_when_no_phrase() {
        assert!(!has_cta("Shipped a thing today."));
        assert!(!has_cta(""));
    }

    #[test]
    fn length_counts_chars() {
        assert_eq!(text_length("héllo"), 5);
        assert_eq!(text_length(""), 0);
    }

    #[tokio::test]
    async fn blank_text_is_neutral_without_model_call() {
        let classifier = FixedClassifier::new("POSITIVE", 0.99);
        let (score, tone) = score_sentiment(&classifier, "  ").await.unwrap();
        assert!(score.abs() < f64::EPSILON);
        assert_eq!(tone, Tone::Neutral);
        assert!(classifier.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn negative_label_is_negated() {
        let classifier = FixedClassifier::new("NEGATIVE", 0.9);
        let (score, tone) = score_sentiment(&classifier, "awful").await.unwrap();
        assert!((score + 0.9).abs() < f64::EPSILON);
        assert_eq!(tone, Tone::Negative);
    }

    #[tokio::test]
    async fn weak_positive_stays_neutral() {
        let classifier = FixedClassifier::new("POSITIVE", 0.3);
        let (_, tone) = score_sentiment(&classifier, "fine").await.unwrap();
        assert_eq!(tone, Tone::Neutral);
    }

    #[tokio::test]
    async fn input_truncated_to_512_chars() {
        let classifier = FixedClassifier::new("POSITIVE", 0.8);
        let long = "é".repeat(600);
        score_sentiment(&classifier, &long).await.unwrap();
        let calls = classifier.calls.lock().unwrap();
        assert_eq!(calls[0].chars().count(), SENTIMENT_MAX_CHARS);
    }
}
