// Retry with growing backoff for external calls.
//
// Any failure (transport error, non-2xx status, empty body) is retried up
// to `retries` more times. The delay grows by BACKOFF_GROWTH per attempt,
// plus a little jitter. Every attempt still passes through the throttle,
// so retries never undercut the inter-request floor.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use tracing::warn;

use super::throttle::Throttle;

/// Multiplier applied to the backoff delay on each further attempt.
pub const BACKOFF_GROWTH: f64 = 1.5;

/// Upper bound of the random extra delay, as a fraction of the backoff.
const MAX_JITTER: f64 = 0.2;

/// How often and how patiently to retry a failed call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub retries: u32,
    /// Delay after the first failed attempt
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 2,
            base_delay: Duration::from_millis(800),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `attempt + 1` (attempt counts from 0).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .mul_f64(BACKOFF_GROWTH.powi(attempt.min(16) as i32))
    }
}

fn jittered(delay: Duration) -> Duration {
    // The sub-second clock is enough variation to spread retries out.
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    let factor = 1.0 + MAX_JITTER * f64::from(nanos % 1000) / 1000.0;
    delay.mul_f64(factor)
}

/// Run `operation` until it succeeds or the policy is exhausted.
///
/// The throttle is acquired before each attempt and released after it,
/// so the gap between calls is measured from when a call finishes.
/// Returns the last error once all attempts fail.
pub async fn with_retry<F, Fut, T>(
    policy: &RetryPolicy,
    throttle: &Throttle,
    label: &str,
    operation: F,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0u32;

    loop {
        throttle.acquire().await;
        let result = operation().await;
        throttle.release().await;

        match result {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= policy.retries {
                    return Err(err.context(format!(
                        "{label}: giving up after {} attempt(s)",
                        attempt + 1
                    )));
                }

                let delay = jittered(policy.backoff(attempt));
                attempt += 1;

                warn!(
                    target_label = label,
                    attempt = attempt,
                    max_retries = policy.retries,
                    backoff_secs = delay.as_secs_f64(),
                    error = %err,
                    "Request failed, retrying in {:.1}s (attempt {}/{})",
                    delay.as_secs_f64(),
                    attempt,
                    policy.retries,
                );

                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn quick_policy(retries: u32) -> RetryPolicy {
        RetryPolicy {
            retries,
            base_delay: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_backoff_grows() {
        let policy = RetryPolicy {
            retries: 3,
            base_delay: Duration::from_millis(100),
        };
        let secs: Vec<f64> = (0..3).map(|a| policy.backoff(a).as_secs_f64()).collect();
        assert!((secs[0] - 0.100).abs() < 1e-6);
        assert!((secs[1] - 0.150).abs() < 1e-6);
        assert!((secs[2] - 0.225).abs() < 1e-6);
    }

    #[test]
    fn test_jitter_never_shrinks_or_overtakes_growth() {
        let base = Duration::from_millis(100);
        let j = jittered(base);
        assert!(j >= base);
        assert!(j <= base.mul_f64(1.0 + MAX_JITTER));
    }

    #[tokio::test]
    async fn test_success_after_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let throttle = Throttle::new(Duration::ZERO);
        let c = calls.clone();
        let result = with_retry(&quick_policy(2), &throttle, "test", || {
            let c = c.clone();
            async move {
                if c.fetch_add(1, Ordering::SeqCst) < 2 {
                    anyhow::bail!("HTTP 503")
                }
                Ok(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let throttle = Throttle::new(Duration::ZERO);
        let c = calls.clone();
        let result: Result<()> = with_retry(&quick_policy(1), &throttle, "test", || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                anyhow::bail!("connection refused")
            }
        })
        .await;
        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("giving up after 2 attempt(s)"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_zero_retries_is_single_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let throttle = Throttle::new(Duration::ZERO);
        let c = calls.clone();
        let _: Result<()> = with_retry(&quick_policy(0), &throttle, "test", || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                anyhow::bail!("boom")
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
