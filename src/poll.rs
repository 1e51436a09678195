//! Fixed-interval polling with an overall deadline.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::{ReleaseError, Result};

/// Interval and deadline of a polling loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollSettings {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        PollSettings { interval, timeout }
    }
}

/// Call `attempt` until it yields `Some`, sleeping `interval` between calls.
///
/// Errors from `attempt` end the loop immediately. When the deadline passes
/// before a value is produced, returns [ReleaseError::Timeout]. A timeout too
/// large to represent as an instant means no deadline.
pub async fn poll_until<T, F, Fut>(what: &str, settings: PollSettings, mut attempt: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let deadline = Instant::now().checked_add(settings.timeout);
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        if let Some(value) = attempt().await? {
            debug!("{} ready after {} attempt(s)", what, attempts);
            return Ok(value);
        }

        if let Some(deadline) = deadline {
            let next_attempt = Instant::now().checked_add(settings.interval);
            if next_attempt.map_or(true, |next| next > deadline) {
                return Err(ReleaseError::timeout(what, settings.timeout.as_secs()));
            }
        }
        sleep(settings.interval).await;
    }
}
