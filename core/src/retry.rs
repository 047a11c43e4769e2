use std::future::Future;
use std::time::Duration;

use rand::Rng;
use serde::Deserialize;
use tokio::time::sleep;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Base delay for exponential backoff.
    pub base_delay_ms: u64,
    /// Jitter added to each delay, as a fraction of it (0.25 = ±25%).
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            max_attempts: 3,
            base_delay_ms: 50,
            jitter_factor: 0.25,
        }
    }
}

/// Runs `func` until it succeeds, fails with an error `is_retryable` rejects,
/// or `max_attempts` is used up. The last error is returned.
pub async fn with_retry<F, Fut, T, E>(
    func: F,
    config: &RetryConfig,
    is_retryable: impl Fn(&E) -> bool,
) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        match func().await {
            Ok(result) => return Ok(result),
            Err(err) if attempt + 1 < max_attempts && is_retryable(&err) => {
                let delay = backoff_with_jitter(attempt, config);
                tracing::warn!(
                    "Retryable error: {}. Retry attempt {}/{} after {:?}",
                    err,
                    attempt + 1,
                    max_attempts - 1,
                    delay
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// base_delay * 2^attempt, with random jitter of ±jitter_factor.
fn backoff_with_jitter(attempt: u32, config: &RetryConfig) -> Duration {
    let base_delay = config.base_delay_ms.saturating_mul(2u64.saturating_pow(attempt));
    let jitter_range = (base_delay as f64 * config.jitter_factor) as u64;
    let jitter = if jitter_range == 0 {
        0
    } else {
        rand::thread_rng().gen_range(0..=jitter_range * 2) as i64 - jitter_range as i64
    };
    let delay_ms = (base_delay as i64 + jitter).max(0) as u64;
    Duration::from_millis(delay_ms)
}
