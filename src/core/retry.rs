//! Retry policy for provider batches.

use std::time::Duration;

use backoff::backoff::Backoff;

/// Linear backoff: the n-th retry waits `step * n`, for at most `max_retries`
/// retries.
#[derive(Debug, Clone)]
pub struct LinearBackoff {
    step: Duration,
    max_retries: u32,
    attempt: u32,
}

impl LinearBackoff {
    pub fn new(step: Duration, max_retries: u32) -> Self {
        Self {
            step,
            max_retries,
            attempt: 0,
        }
    }

    /// Retries handed out so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }
}

impl Backoff for LinearBackoff {
    fn reset(&mut self) {
        self.attempt = 0;
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        if self.attempt >= self.max_retries {
            return None;
        }
        self.attempt += 1;
        Some(self.step * self.attempt)
    }
}
