//! Bounded retry with backoff.
//!
//! The metadata checker, the fetch engine and database connection
//! acquisition all recover the same way: a fixed attempt budget with a
//! sleep between failures. This module is the single implementation,
//! parameterized by the budget and the backoff curve.

use std::future::Future;
use std::time::Duration;

/// Delay curve applied between failed attempts.
#[derive(Debug, Clone, Copy)]
pub enum Backoff {
    /// Same delay after every failure.
    Fixed(Duration),
    /// `step * attempt` after the nth failure (step, 2*step, 3*step, ...).
    Linear(Duration),
}

impl Backoff {
    fn delay(&self, attempt: u32) -> Duration {
        match self {
            Backoff::Fixed(delay) => *delay,
            Backoff::Linear(step) => *step * attempt,
        }
    }
}

/// Every attempt failed; carries the final error and the attempt count.
#[derive(Debug, thiserror::Error)]
#[error("all {attempts} attempts failed: {last}")]
pub struct RetriesExhausted<E: std::error::Error> {
    pub attempts: u32,
    #[source]
    pub last: E,
}

/// Attempt budget plus backoff curve.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Backoff,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Linearly growing backoff: step, 2*step, ... (uncapped).
    pub fn linear(max_attempts: u32, step: Duration) -> Self {
        Self::new(max_attempts, Backoff::Linear(step))
    }

    /// Constant backoff between attempts.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self::new(max_attempts, Backoff::Fixed(delay))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `op` until it succeeds or the budget is spent.
    ///
    /// The closure receives the 1-based attempt number. A sleep happens
    /// after every failure except the last one.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, RetriesExhausted<E>>
    where
        E: std::error::Error,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(last) if attempt >= self.max_attempts => {
                    return Err(RetriesExhausted {
                        attempts: attempt,
                        last,
                    })
                }
                Err(_) => {
                    tokio::time::sleep(self.backoff.delay(attempt)).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug, thiserror::Error)]
    #[error("boom")]
    struct Boom;

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = Cell::new(0u32);
        let policy = RetryPolicy::linear(5, Duration::ZERO);

        let result = policy
            .run(|attempt| {
                calls.set(calls.get() + 1);
                async move {
                    if attempt < 3 {
                        Err(Boom)
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn exhausts_the_attempt_budget() {
        let calls = Cell::new(0u32);
        let policy = RetryPolicy::fixed(4, Duration::ZERO);

        let result: Result<(), _> = policy
            .run(|_| {
                calls.set(calls.get() + 1);
                async { Err(Boom) }
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.attempts, 4);
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn linear_backoff_grows_per_attempt() {
        let backoff = Backoff::Linear(Duration::from_secs(2));
        assert_eq!(backoff.delay(1), Duration::from_secs(2));
        assert_eq!(backoff.delay(5), Duration::from_secs(10));
        assert_eq!(backoff.delay(10), Duration::from_secs(20));
    }

    #[test]
    fn zero_attempts_is_clamped_to_one() {
        let policy = RetryPolicy::fixed(0, Duration::ZERO);
        assert_eq!(policy.max_attempts(), 1);
    }
}
