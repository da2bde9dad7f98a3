//! Retry policy: exponential backoff with jitter around store operations

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Bounded exponential backoff, shared by every gateway operation.
///
/// Stateless between calls, so one policy can back any number of sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry (doubles each retry)
    pub base_delay: Duration,
    /// Upper bound for a single delay
    pub max_delay: Duration,
    /// Randomize each delay within `[d/2, d]`
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay before retry number `retry` (1-based), before jitter
    #[must_use]
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    fn jittered(&self, delay: Duration) -> Duration {
        if !self.jitter || delay.is_zero() {
            return delay;
        }
        let half = delay / 2;
        let spread = u64::try_from(half.as_nanos()).unwrap_or(u64::MAX);
        if spread == 0 {
            return delay;
        }
        let random = uuid::Uuid::new_v4().as_u128() as u64;
        half + Duration::from_nanos(random % (spread + 1))
    }

    /// Run `operation`, retrying while `is_retriable` accepts the error.
    ///
    /// Non-retriable errors return immediately. When retries are exhausted
    /// the last error is returned.
    ///
    /// # Errors
    /// Returns the operation's error once it is non-retriable or retries run out.
    pub async fn run<T, E, F, Fut>(
        &self,
        name: &str,
        is_retriable: fn(&E) -> bool,
        mut operation: F,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut retry = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if retry < self.max_retries && is_retriable(&e) => {
                    retry += 1;
                    let delay = self.jittered(self.backoff(retry));
                    tracing::warn!(
                        "{} failed with transient error, retry {}/{} in {:?}: {}",
                        name,
                        retry,
                        self.max_retries,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    if retry > 0 {
                        tracing::error!("{} failed after {} retries: {}", name, retry, e);
                    }
                    return Err(e);
                }
            }
        }
    }
}
