//! Attempt-level retry as an explicit state machine.
//!
//! ```text
//! Attempting(n) --ok--> Succeeded
//!      |
//!     err, n < max --> BackingOff(n) --sleep--> Attempting(n + 1)
//!      |
//!     err, n == max --> Exhausted
//! ```
//!
//! Sleeping goes through the [`Sleeper`] trait so tests can record the
//! backoff schedule without waiting for it.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::config::RetryPolicy;
use crate::error::TransportError;

/// Where a retried operation currently is
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptState<T> {
    /// About to make attempt number `attempt` (1-based)
    Attempting { attempt: u32 },
    /// Attempt `attempt` failed with `error`; waiting `delay` before the next
    BackingOff {
        attempt: u32,
        delay: Duration,
        error: TransportError,
    },
    /// Every attempt failed; `error` is the last failure
    Exhausted { attempts: u32, error: TransportError },
    Succeeded { attempts: u32, value: T },
}

impl RetryPolicy {
    /// The state that follows the outcome of attempt `attempt`
    pub fn transition<T>(&self, attempt: u32, outcome: Result<T, TransportError>) -> AttemptState<T> {
        match outcome {
            Ok(value) => AttemptState::Succeeded {
                attempts: attempt,
                value,
            },
            Err(error) if attempt < self.max_attempts => AttemptState::BackingOff {
                attempt,
                delay: self.backoff_delay(attempt),
                error,
            },
            Err(error) => AttemptState::Exhausted {
                attempts: attempt,
                error,
            },
        }
    }
}

/// Injectable sleep, so backoff can be observed in tests
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Drive `operation` through the state machine until it succeeds or the
/// policy is exhausted.
///
/// `operation` receives the 1-based attempt number. Both sides of the result
/// carry the number of attempts made; the error is the last failure.
pub async fn run<T, F, Fut>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    mut operation: F,
) -> Result<(T, u32), (TransportError, u32)>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, TransportError>>,
{
    let mut state = AttemptState::Attempting { attempt: 1 };

    loop {
        state = match state {
            AttemptState::Attempting { attempt } => {
                let outcome = operation(attempt).await;
                policy.transition(attempt, outcome)
            }
            AttemptState::BackingOff {
                attempt,
                delay,
                error,
            } => {
                debug!(
                    "Attempt {}/{} failed ({}), retrying in {:?}",
                    attempt, policy.max_attempts, error, delay
                );
                sleeper.sleep(delay).await;
                AttemptState::Attempting {
                    attempt: attempt + 1,
                }
            }
            AttemptState::Succeeded { attempts, value } => return Ok((value, attempts)),
            AttemptState::Exhausted { attempts, error } => return Err((error, attempts)),
        };
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use parking_lot::Mutex;

    /// Sleeper that returns immediately and remembers what it was asked to do
    #[derive(Debug, Default)]
    pub struct RecordingSleeper {
        slept: Mutex<Vec<Duration>>,
    }

    impl RecordingSleeper {
        pub fn slept(&self) -> Vec<Duration> {
            self.slept.lock().clone()
        }
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.slept.lock().push(duration);
        }
    }
}
