//! Bounded fixed-delay polling.

use std::fmt::Display;
use std::time::Duration;

use backon::{ConstantBuilder, Retryable, Sleeper};
use tracing::debug;

/// How often and how far apart to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Total attempts including the first; zero behaves like one.
    pub attempts: u32,
    pub delay: Duration,
}

impl PollPolicy {
    pub const fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    fn backoff(self) -> ConstantBuilder {
        ConstantBuilder::default()
            .with_delay(self.delay)
            .with_max_times(self.attempts.saturating_sub(1) as usize)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

/// Runs `op` until it succeeds, the error is not retryable, or the attempts
/// run out. Returns the last result.
pub async fn poll_until<T, E, Fut, Op, S, R>(
    policy: PollPolicy,
    sleeper: S,
    op: Op,
    retryable: R,
) -> Result<T, E>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    S: Sleeper,
    R: FnMut(&E) -> bool,
    E: Display,
{
    op.retry(policy.backoff())
        .sleep(sleeper)
        .when(retryable)
        .notify(|err: &E, dur: Duration| {
            debug!(error = %err, delay = ?dur, "Not ready yet");
        })
        .await
}
