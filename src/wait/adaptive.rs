//! Adaptive polling wait

use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, trace};

use crate::error::{Error, Result};

/// Polling configuration of an [`AdaptiveWait`]
#[derive(Debug, Clone, PartialEq)]
pub struct WaitSpec {
    /// Overall wall-clock budget
    pub timeout: Duration,
    /// First poll interval
    pub min_poll: Duration,
    /// Upper bound of the poll interval
    pub max_poll: Duration,
    /// Grow the interval after each failed poll
    pub progressive: bool,
    /// Growth factor in progressive mode
    pub factor: f64,
    /// Maximum number of polls
    pub retry_attempts: u32,
}

impl Default for WaitSpec {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            min_poll: Duration::from_millis(250),
            max_poll: Duration::from_secs(2),
            progressive: true,
            factor: 2.0,
            retry_attempts: 3,
        }
    }
}

impl WaitSpec {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_polling(mut self, min_poll: Duration, max_poll: Duration) -> Self {
        self.min_poll = min_poll;
        self.max_poll = max_poll.max(min_poll);
        self
    }

    pub fn with_progressive(mut self, progressive: bool, factor: f64) -> Self {
        self.progressive = progressive;
        self.factor = if factor.is_finite() { factor.max(1.0) } else { 1.0 };
        self
    }

    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts.max(1);
        self
    }

    /// Interval slept after the `k`-th failed poll (0-based)
    ///
    /// `min(min_poll * factor^k, max_poll)` in progressive mode, `min_poll`
    /// otherwise.
    pub fn interval_after(&self, k: u32) -> Duration {
        if !self.progressive {
            return self.min_poll;
        }
        let exponent = i32::try_from(k).unwrap_or(i32::MAX);
        let scaled = self.min_poll.as_secs_f64() * self.factor.powi(exponent);
        Duration::from_secs_f64(scaled.min(self.max_poll.as_secs_f64()))
    }
}

/// Repeatedly evaluates a condition until it holds or the budget runs out
#[derive(Debug, Clone, Default)]
pub struct AdaptiveWait {
    spec: WaitSpec,
}

impl AdaptiveWait {
    pub fn new(spec: WaitSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &WaitSpec {
        &self.spec
    }

    /// Poll `condition` until it yields `Some`
    ///
    /// Errors and `None` results count as "not yet"; the last error is kept
    /// as the cause of the final [`Error::Timeout`].
    pub async fn until<T, F, Fut>(&self, what: &str, mut condition: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        let started = Instant::now();
        let deadline = started + self.spec.timeout;
        let mut attempts = 0u32;
        let mut last_error: Option<Error> = None;

        loop {
            attempts += 1;
            match condition().await {
                Ok(Some(value)) => {
                    debug!("Condition '{}' met after {} polls", what, attempts);
                    return Ok(value);
                }
                Ok(None) => trace!("Condition '{}' not met (poll {})", what, attempts),
                Err(e) => {
                    debug!("Condition '{}' raised on poll {}: {}", what, attempts, e);
                    last_error = Some(e);
                }
            }

            let now = Instant::now();
            if attempts >= self.spec.retry_attempts || now >= deadline {
                break;
            }
            let pause = self.spec.interval_after(attempts - 1).min(deadline - now);
            sleep(pause).await;
        }

        let elapsed = started.elapsed();
        debug!(
            "Condition '{}' gave up after {} polls in {:?}",
            what, attempts, elapsed
        );
        Err(Error::Timeout {
            elapsed_ms: elapsed.as_millis() as u64,
            attempts,
            last_cause: last_error.map(Box::new),
        })
    }

    /// Poll a boolean condition until it returns `true`
    pub async fn until_true<F, Fut>(&self, what: &str, mut condition: F) -> Result<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        self.until(what, || {
            let poll = condition();
            async move { poll.await.map(|met| met.then_some(())) }
        })
        .await
    }
}
