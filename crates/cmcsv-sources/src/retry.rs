//! Retry with exponential back-off and jitter for external lookups.
//!
//! [`RetryPolicy::run`] wraps any fallible async operation and retries on
//! transient errors (network failures, 429, 5xx). Everything else is returned
//! immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::SourceError;

/// Upper bound for a single back-off sleep.
const MAX_DELAY_MS: u64 = 30_000;

/// How often and how patiently an external call is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure. `0` disables retries.
    pub max_retries: u32,
    /// Base delay; the n-th retry waits `backoff_base_ms * 2^(n-1)` ± 25 %.
    pub backoff_base_ms: u64,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_retries: u32, backoff_base_ms: u64) -> Self {
        Self {
            max_retries,
            backoff_base_ms,
        }
    }

    /// No retries; used by tests that assert on the first failure.
    #[must_use]
    pub fn none() -> Self {
        Self::new(0, 0)
    }

    /// Runs `operation`, retrying transient failures per this policy.
    ///
    /// Back-off schedule with `backoff_base_ms = 500`:
    ///
    /// | Retry | Sleep before it          |
    /// |-------|--------------------------|
    /// | 1     | 500 ms × 2⁰ ± 25 % jitter |
    /// | 2     | 500 ms × 2¹ ± 25 % jitter |
    /// | 3     | 500 ms × 2² ± 25 % jitter |
    ///
    /// # Errors
    ///
    /// Returns the first non-retriable error, or the last error once retries
    /// are exhausted.
    pub(crate) async fn run<T, F, Fut>(self, mut operation: F) -> Result<T, SourceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SourceError>>,
    {
        let mut attempt = 0u32;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if !is_retriable(&err) || attempt >= self.max_retries {
                        return Err(err);
                    }
                    attempt += 1;
                    let delay_ms = self.delay_for(&err, attempt);
                    tracing::warn!(
                        attempt,
                        max_retries = self.max_retries,
                        delay_ms,
                        error = %err,
                        "transient source error, retrying after back-off"
                    );
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }

    /// Back-off before retry `attempt`. A server-requested `Retry-After`
    /// extends the delay, up to [`MAX_DELAY_MS`].
    fn delay_for(self, err: &SourceError, attempt: u32) -> u64 {
        let backoff = self.delay_ms(attempt);
        match err {
            SourceError::RateLimited {
                retry_after_secs, ..
            } => backoff
                .max(retry_after_secs.saturating_mul(1_000))
                .min(MAX_DELAY_MS),
            _ => backoff,
        }
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn delay_ms(self, attempt: u32) -> u64 {
        let computed = self
            .backoff_base_ms
            .saturating_mul(1u64 << attempt.saturating_sub(1).min(10));
        let capped = computed.min(MAX_DELAY_MS);
        (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64
    }
}

/// Seconds requested by a `Retry-After` header, in its delta-seconds form.
pub(crate) fn retry_after_secs(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
}

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// Retriable: timeouts, connection failures, 429 and 5xx responses.
/// Everything else (4xx, malformed bodies, bad configuration) fails the
/// same way on every attempt.
pub(crate) fn is_retriable(err: &SourceError) -> bool {
    match err {
        SourceError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        SourceError::RateLimited { .. } => true,
        SourceError::UnexpectedStatus { status, .. } => *status >= 500,
        SourceError::Deserialize { .. }
        | SourceError::InvalidBaseUrl { .. }
        | SourceError::NoObservation(_) => false,
    }
}
