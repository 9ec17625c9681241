//! Fixed-pause retry shared by sensor bring-up and sensor reads.

use std::num::NonZeroU32;
use std::time::Duration;

use pmon_traits::Clock;

/// How often and how long to retry a failing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Pause between a failure and the next attempt.
    pub pause: Duration,
    /// `None` retries forever.
    pub max_attempts: Option<NonZeroU32>,
}

impl RetryPolicy {
    pub fn forever(pause: Duration) -> Self {
        Self {
            pause,
            max_attempts: None,
        }
    }

    /// Give up after `attempts` calls. Zero is treated as one.
    pub fn bounded(pause: Duration, attempts: u32) -> Self {
        Self {
            pause,
            max_attempts: Some(NonZeroU32::new(attempts).unwrap_or(NonZeroU32::MIN)),
        }
    }
}

/// Returned when a bounded policy runs out of attempts.
#[derive(Debug)]
pub struct Exhausted<E> {
    pub attempts: u32,
    pub last: E,
}

/// Call `attempt` until it succeeds or the policy is exhausted.
///
/// `on_failure` sees every error with its 1-based attempt number before the
/// pause. With an unbounded policy this only returns `Ok`.
pub fn retry<T, E>(
    clock: &dyn Clock,
    policy: &RetryPolicy,
    mut attempt: impl FnMut() -> Result<T, E>,
    mut on_failure: impl FnMut(&E, u32),
) -> Result<T, Exhausted<E>> {
    let mut attempts: u32 = 0;
    loop {
        attempts = attempts.saturating_add(1);
        match attempt() {
            Ok(v) => return Ok(v),
            Err(e) => {
                on_failure(&e, attempts);
                if let Some(max) = policy.max_attempts
                    && attempts >= max.get()
                {
                    return Err(Exhausted { attempts, last: e });
                }
                clock.sleep(policy.pause);
            }
        }
    }
}
