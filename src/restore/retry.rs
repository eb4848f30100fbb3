// graphrestore/src/restore/retry.rs
use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::RetryConfig;
use crate::errors::{RestoreError, Result};

/// Bounded retry with linear backoff: the delay after attempt `n` is
/// `base_delay * n`. Only retryable errors are attempted again.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: config.base_delay,
        }
    }

    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            debug!(operation, attempt, max_attempts = self.max_attempts, "Attempting");
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.base_delay * attempt;
                    warn!(
                        operation,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Attempt failed, retrying in {:?}",
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) if e.is_retryable() => {
                    return Err(RestoreError::RetriesExhausted {
                        operation: operation.to_string(),
                        attempts: attempt,
                        source: Box::new(e),
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(&RetryConfig {
            max_attempts,
            base_delay: Duration::from_millis(100),
        })
    }

    fn unavailable() -> RestoreError {
        RestoreError::Remote {
            operation: "restoring vertices".to_string(),
            status: Some(503),
            message: "unavailable".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_failures() -> anyhow::Result<()> {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let value = policy(3)
            .run("restoring vertices", || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(unavailable())
                } else {
                    Ok(42)
                }
            })
            .await?;
        assert_eq!(value, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<()> = policy(3)
            .run("restoring edges", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(unavailable())
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match result {
            Err(RestoreError::RetriesExhausted {
                operation, attempts, ..
            }) => {
                assert_eq!(operation, "restoring edges");
                assert_eq!(attempts, 3);
            }
            other => panic!("expected RetriesExhausted, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_error_fails_immediately() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<()> = policy(5)
            .run("restoring edges", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(RestoreError::Remote {
                    operation: "adding edges".to_string(),
                    status: Some(400),
                    message: "bad edge".to_string(),
                })
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(RestoreError::Remote { status: Some(400), .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_grows_linearly() -> anyhow::Result<()> {
        let start = tokio::time::Instant::now();
        let counter = AtomicU32::new(0);
        let calls = &counter;
        policy(3)
            .run("restoring vertices", || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(unavailable())
                } else {
                    Ok(())
                }
            })
            .await?;
        // 100ms after the first failure, 200ms after the second.
        assert!(start.elapsed() >= Duration::from_millis(300));
        Ok(())
    }
}
