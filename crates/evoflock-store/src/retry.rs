use std::{fmt::Display, thread, time::Duration};

use tracing::warn;

/// Bounded retry with a fixed backoff for contended file operations.
///
/// Retries are expected behavior here, not an exception path: sibling
/// processes write the shared file without locking, so a read can land in
/// the middle of a write. The policy is explicit data so tests can shrink
/// the backoff to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Runs `op` until it succeeds or the attempt budget is exhausted,
    /// sleeping between attempts. Returns the last error on exhaustion.
    ///
    /// # Panics
    ///
    /// Panics if `max_attempts` is 0.
    pub fn run<T, E, F>(&self, what: &str, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
        E: Display,
    {
        assert!(self.max_attempts >= 1, "retry needs at least one attempt");
        let mut last_error = None;
        for attempt in 1..=self.max_attempts {
            match op() {
                Ok(value) => return Ok(value),
                Err(error) => {
                    warn!(attempt, max = self.max_attempts, %error, "conflict on {what}");
                    last_error = Some(error);
                }
            }
            if attempt < self.max_attempts {
                thread::sleep(self.backoff);
            }
        }
        Err(last_error.unwrap())
    }
}
