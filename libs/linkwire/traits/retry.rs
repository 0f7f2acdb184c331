use std::time::Duration;

/// Trait for caller-side connect retries
///
/// The transport itself never retries a failed connect. Callers that want to
/// try again after `ConnectionFailed` or an abnormal `Disconnected` ask a
/// policy how long to wait.
pub trait RetryPolicy: Send + Sync {
    /// Delay before retry number `attempt` (0-indexed), `None` to give up
    fn next_delay(&self, attempt: usize) -> Option<Duration>;
}

/// Exponential backoff: `initial * 2^attempt`, capped at `max`
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    initial_delay: Duration,
    max_delay: Duration,
    max_attempts: Option<usize>,
}

impl ExponentialBackoff {
    /// # Arguments
    /// * `initial_delay` - Delay before the first retry
    /// * `max_delay` - Upper bound for any delay
    /// * `max_attempts` - Maximum number of retries (None = unlimited)
    pub fn new(initial_delay: Duration, max_delay: Duration, max_attempts: Option<usize>) -> Self {
        Self {
            initial_delay,
            max_delay,
            max_attempts,
        }
    }
}

impl RetryPolicy for ExponentialBackoff {
    fn next_delay(&self, attempt: usize) -> Option<Duration> {
        if self.max_attempts.is_some_and(|max| attempt >= max) {
            return None;
        }

        let factor = 2u64.saturating_pow(attempt.min(63) as u32);
        let delay = (self.initial_delay.as_millis() as u64).saturating_mul(factor);
        Some(Duration::from_millis(delay.min(self.max_delay.as_millis() as u64)))
    }
}

/// Same delay between every retry
#[derive(Debug, Clone)]
pub struct FixedDelay {
    delay: Duration,
    max_attempts: Option<usize>,
}

impl FixedDelay {
    pub fn new(delay: Duration, max_attempts: Option<usize>) -> Self {
        Self { delay, max_attempts }
    }
}

impl RetryPolicy for FixedDelay {
    fn next_delay(&self, attempt: usize) -> Option<Duration> {
        if self.max_attempts.is_some_and(|max| attempt >= max) {
            return None;
        }
        Some(self.delay)
    }
}

/// Give up after the first failure
#[derive(Debug, Clone)]
pub struct NoRetry;

impl RetryPolicy for NoRetry {
    fn next_delay(&self, _attempt: usize) -> Option<Duration> {
        None
    }
}
