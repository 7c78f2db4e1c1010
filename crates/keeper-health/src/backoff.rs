//! Bounded exponential backoff polling.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

/// Delay curve and attempt budget for a polling loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    /// Total number of observations before giving up.
    pub max_attempts: u32,
    /// Delay before the first observation.
    pub initial_delay: Duration,
    /// Growth factor applied after each unsuccessful observation (>= 1.0).
    pub factor: f64,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
}

impl BackoffPolicy {
    /// Wait for an application to report `STARTED`.
    pub const APP_STARTED: Self = Self {
        max_attempts: 8,
        initial_delay: Duration::from_millis(2000),
        factor: 1.6,
        max_delay: Duration::from_millis(15000),
    };

    /// Wait for at least one process instance to report `RUNNING`.
    pub const INSTANCES_RUNNING: Self = Self {
        max_attempts: 10,
        initial_delay: Duration::from_millis(2000),
        factor: 1.6,
        max_delay: Duration::from_millis(15000),
    };

    /// The delay slept before each attempt, in order.
    pub fn delays(&self) -> Delays {
        Delays {
            next: self.initial_delay.min(self.max_delay),
            remaining: self.max_attempts,
            factor: self.factor.max(1.0),
            cap: self.max_delay,
        }
    }

    /// Upper bound on the time a full polling loop spends sleeping.
    pub fn total_wait(&self) -> Duration {
        self.delays().sum()
    }
}

/// Iterator over a policy's delay sequence.
#[derive(Debug, Clone)]
pub struct Delays {
    next: Duration,
    remaining: u32,
    factor: f64,
    cap: Duration,
}

impl Iterator for Delays {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let current = self.next;
        let grown = (current.as_millis() as f64 * self.factor).round() as u64;
        self.next = Duration::from_millis(grown).min(self.cap);
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining as usize;
        (n, Some(n))
    }
}

/// Why a polling loop ended without success.
#[derive(Debug, Error)]
pub enum PollError<E> {
    /// Every attempt observed an unsatisfying state.
    #[error("condition not met after {attempts} attempts, last observed: {last_observed}")]
    Exhausted { attempts: u32, last_observed: String },

    /// An observation itself failed; polling stops immediately.
    #[error("observation failed: {0}")]
    Probe(E),
}

/// Poll `observe` until `satisfied` accepts its output.
///
/// Each attempt sleeps the next delay of `policy` first, then observes.
/// Observation errors abort the loop and are returned as
/// [`PollError::Probe`].
pub async fn poll_until<S, E, F, Fut, P>(
    policy: &BackoffPolicy,
    label: &str,
    mut observe: F,
    satisfied: P,
) -> Result<S, PollError<E>>
where
    S: fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<S, E>>,
    P: Fn(&S) -> bool,
{
    let mut last_observed = None;

    for (index, delay) in policy.delays().enumerate() {
        let attempt = index + 1;
        tokio::time::sleep(delay).await;

        let state = observe().await.map_err(PollError::Probe)?;
        debug!(%label, attempt, %state, delay_ms = delay.as_millis() as u64, "poll attempt");

        if satisfied(&state) {
            return Ok(state);
        }
        last_observed = Some(state.to_string());
    }

    Err(PollError::Exhausted {
        attempts: policy.max_attempts,
        last_observed: last_observed.unwrap_or_else(|| "nothing".to_string()),
    })
}
