//! Retry with exponential back-off and jitter for chat completions.
//!
//! [`retry_with_backoff`] wraps a fallible async call and retries transient
//! failures (network, 5xx, 429). Everything else is returned immediately.

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;

use crate::error::GeneratorError;

const MAX_DELAY_MS: u64 = 30_000;

/// Returns `true` for errors worth retrying after a back-off delay.
///
/// **Retriable:** timeouts, connection failures, HTTP 5xx and 429.
///
/// **Not retriable:** other 4xx statuses (bad key, bad request), empty or
/// malformed responses, and every local error.
pub(crate) fn is_retriable(err: &GeneratorError) -> bool {
    match err {
        GeneratorError::Http(e) => {
            e.is_timeout()
                || e.is_connect()
                || e.status().is_some_and(|s| {
                    s.is_server_error() || s == StatusCode::TOO_MANY_REQUESTS
                })
        }
        GeneratorError::Api(_)
        | GeneratorError::MissingApiKey
        | GeneratorError::Deserialize { .. }
        | GeneratorError::InvalidFeedback(_)
        | GeneratorError::Io { .. }
        | GeneratorError::Json { .. }
        | GeneratorError::Csv { .. }
        | GeneratorError::Storage(_) => false,
    }
}

/// Un-jittered delay before retry number `retry` (1-based):
/// `base_ms × 2^(retry-1)`, capped at 30 s.
fn base_delay_ms(retry: u32, base_ms: u64) -> u64 {
    let exponent = retry.saturating_sub(1).min(10);
    base_ms.saturating_mul(1u64 << exponent).min(MAX_DELAY_MS)
}

/// Scales `delay_ms` by a random factor in `[0.75, 1.25)`.
fn with_jitter(delay_ms: u64) -> Duration {
    let factor = 0.75 + rand::random::<f64>() * 0.5;
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let jittered = (delay_ms as f64 * factor) as u64;
    Duration::from_millis(jittered)
}

/// Runs `call` once, then up to `max_retries` more times while it fails
/// with a retriable error.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut call: F,
) -> Result<T, GeneratorError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GeneratorError>>,
{
    let mut retry = 0u32;
    loop {
        let err = match call().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if retry >= max_retries || !is_retriable(&err) {
            return Err(err);
        }
        retry += 1;
        let delay = with_jitter(base_delay_ms(retry, backoff_base_ms));
        tracing::warn!(
            retry,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "chat API call failed, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    async fn connect_error() -> GeneratorError {
        let err = reqwest::Client::new()
            .get("http://0.0.0.0:1")
            .send()
            .await
            .unwrap_err();
        GeneratorError::Http(err)
    }

    #[test]
    fn local_errors_are_not_retriable() {
        assert!(!is_retriable(&GeneratorError::Api("empty".to_string())));
        assert!(!is_retriable(&GeneratorError::MissingApiKey));
        assert!(!is_retriable(&GeneratorError::InvalidFeedback("x".to_string())));
    }

    #[test]
    fn delay_doubles_and_caps() {
        assert_eq!(base_delay_ms(1, 1_000), 1_000);
        assert_eq!(base_delay_ms(2, 1_000), 2_000);
        assert_eq!(base_delay_ms(4, 1_000), 8_000);
        assert_eq!(base_delay_ms(9, 1_000), MAX_DELAY_MS);
        assert_eq!(base_delay_ms(3, 0), 0);
    }

    #[test]
    fn jitter_stays_within_a_quarter() {
        for _ in 0..50 {
            let ms = with_jitter(1_000).as_millis();
            assert!((750..1_250).contains(&ms), "got {ms}");
        }
    }

    #[tokio::test]
    async fn first_success_is_returned_without_retry() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let result = retry_with_backoff(3, 0, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, GeneratorError>("done")
        })
        .await;
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn api_error_is_returned_immediately() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let result = retry_with_backoff(3, 0, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(GeneratorError::Api("no choices".to_string()))
        })
        .await;
        assert!(matches!(result, Err(GeneratorError::Api(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn connect_errors_are_retried_until_success() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let result = retry_with_backoff(3, 0, move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(connect_error().await)
            } else {
                Ok(7)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retries_stop_at_the_limit() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let result = retry_with_backoff(2, 0, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(connect_error().await)
        })
        .await;
        assert!(matches!(result, Err(GeneratorError::Http(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
