use std::thread;
use std::time::Duration;

use tracing::warn;

use crate::config::Settings;
use crate::error::Result;

/// Re-runs an operation whose error is transient, doubling the pause each time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub const NONE: RetryPolicy = RetryPolicy { max_retries: 0, backoff: Duration::ZERO };

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            max_retries: settings.max_retries,
            backoff: Duration::from_millis(settings.retry_backoff_ms),
        }
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(2u32.saturating_pow(attempt))
    }

    pub fn run<T>(&self, what: &str, mut op: impl FnMut() -> Result<T>) -> Result<T> {
        let mut attempt = 0;
        loop {
            match op() {
                Err(err) if err.is_transient() && attempt < self.max_retries => {
                    let delay = self.delay_for(attempt);
                    warn!(what, attempt = attempt + 1, ?delay, error = %err, "Retrying");
                    thread::sleep(delay);
                    attempt += 1;
                }
                outcome => return outcome,
            }
        }
    }
}
