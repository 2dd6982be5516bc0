use crate::config::RetryConfig;
use crate::error::GenerationError;
use log::{debug, warn};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Errors that know whether another attempt could succeed
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for GenerationError {
    fn is_retryable(&self) -> bool {
        GenerationError::is_retryable(self)
    }
}

/// Exponential backoff policy wrapped around a fallible async operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    pub initial_delay: Duration,
    /// Upper bound for a single wait; `None` lets the delay keep doubling
    pub max_delay: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(1000),
            max_delay: Some(Duration::from_secs(30)),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: (config.max_delay_ms > 0)
                .then(|| Duration::from_millis(config.max_delay_ms)),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
            max_delay: None,
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    /// Delay before the retry that follows `attempt` (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        let delay = self.initial_delay.saturating_mul(factor);
        match self.max_delay {
            Some(cap) => delay.min(cap),
            None => delay,
        }
    }

    /// Run `operation` until it succeeds, fails with a non-retryable error,
    /// or the attempt budget runs out. The last error is returned unchanged.
    ///
    /// Waiting between attempts is a timer suspension, so other tasks on the
    /// runtime keep making progress.
    pub async fn invoke<T, E, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + std::fmt::Display,
    {
        let mut attempt = 1;
        loop {
            debug!("{} (attempt {}/{})", label, attempt, self.max_attempts);

            let error = match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            if !error.is_retryable() {
                warn!("{} failed with a non-retryable error: {}", label, error);
                return Err(error);
            }
            if attempt >= self.max_attempts {
                warn!(
                    "{} failed after {} attempts: {}",
                    label, self.max_attempts, error
                );
                return Err(error);
            }

            let delay = self.delay_after(attempt);
            warn!(
                "{} failed (attempt {}/{}), retrying in {:?}: {}",
                label, attempt, self.max_attempts, delay, error
            );
            sleep(delay).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn unavailable() -> GenerationError {
        GenerationError::transport(Some(503), "unavailable")
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.initial_delay, Duration::from_millis(1000));
    }

    #[test]
    fn test_delay_doubles_and_caps() {
        let policy = RetryPolicy::new(10, Duration::from_millis(1000));
        assert_eq!(policy.delay_after(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_after(2), Duration::from_millis(2000));
        assert_eq!(policy.delay_after(4), Duration::from_millis(8000));
        assert_eq!(policy.delay_after(7), Duration::from_millis(64000));

        let capped = policy.with_max_delay(Duration::from_secs(30));
        assert_eq!(capped.delay_after(7), Duration::from_secs(30));
    }

    #[test]
    fn test_policy_from_config() {
        let config = RetryConfig {
            max_attempts: 0,
            initial_delay_ms: 250,
            max_delay_ms: 0,
        };
        let policy = RetryPolicy::from(&config);
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.initial_delay, Duration::from_millis(250));
        assert_eq!(policy.max_delay, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_fifth_attempt() {
        let calls = &AtomicU32::new(0);
        let start = Instant::now();

        let result = RetryPolicy::default()
            .invoke("flaky", move || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 5 {
                    Err(unavailable())
                } else {
                    Ok(n)
                }
            })
            .await;

        assert_eq!(result, Ok(5));
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        // 1s + 2s + 4s + 8s of backoff
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(15000));
        assert!(elapsed < Duration::from_millis(16000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_budget_and_returns_last_error() {
        let calls = &AtomicU32::new(0);

        let result: Result<(), GenerationError> = RetryPolicy::default()
            .invoke("down", move || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                Err(GenerationError::transport(Some(500), format!("failure {n}")))
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(
            result,
            Err(GenerationError::transport(Some(500), "failure 5"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_decode_error_is_not_retried() {
        let calls = &AtomicU32::new(0);

        let result: Result<(), GenerationError> = RetryPolicy::default()
            .invoke("garbled", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(GenerationError::Decode("not json".to_string()))
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(GenerationError::Decode(_))));
    }
}
