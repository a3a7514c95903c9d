// Request throttle — a hard minimum gap between external calls.
//
// The suggestion service and the competitor search pages are shared,
// unauthenticated endpoints. Every call goes through one throttle: the
// next call may not start until `interval` has passed since the previous
// call finished.

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

/// Enforces a minimum delay between successive requests.
#[derive(Clone)]
pub struct Throttle {
    inner: Arc<Mutex<ThrottleInner>>,
}

struct ThrottleInner {
    /// Minimum time between the end of one call and the start of the next
    interval: Duration,
    /// When the last call finished
    last_done: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ThrottleInner {
                interval,
                last_done: None,
            })),
        }
    }

    /// Wait until a request is allowed, then return.
    ///
    /// The first request goes through immediately.
    pub async fn acquire(&self) {
        let wait = {
            let inner = self.inner.lock().await;
            inner.last_done.and_then(|last| {
                let elapsed = last.elapsed();
                (elapsed < inner.interval).then(|| inner.interval - elapsed)
            })
        };
        if let Some(wait) = wait {
            tokio::time::sleep(wait).await;
        }
    }

    /// Record that a call has finished; the gap is measured from here.
    pub async fn release(&self) {
        self.inner.lock().await.last_done = Some(Instant::now());
    }
}
