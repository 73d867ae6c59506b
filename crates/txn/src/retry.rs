//! Deadline-bound retry
//!
//! [`RetryPolicy`] bounds a logical operation's lifetime by wall clock. On
//! conflict the previous attempt is discarded wholesale and a fresh one
//! starts; on rejection the loop returns at once; when the deadline passes
//! the loop reports [`TimedOut`] rather than ever starting another attempt.
//!
//! The deadline check is strict and runs before every attempt, so no attempt
//! begins at or after the deadline. Backoff is optional — it reduces
//! contention, it is not needed for correctness — and sleeps are clamped to
//! the remaining window.

use std::thread;
use std::time::{Duration, Instant};

use bazaar_core::Result;
use rand::Rng;

use crate::outcome::{Completion, Outcome, TimedOut};

/// Jittered, capped, multiplicative backoff between conflicting attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    cap: Duration,
}

impl Backoff {
    /// Backoff growing from `base`, never exceeding `cap`
    pub fn new(base: Duration, cap: Duration) -> Self {
        Backoff { base, cap }
    }

    /// No sleeping between attempts
    pub fn none() -> Self {
        Backoff {
            base: Duration::ZERO,
            cap: Duration::ZERO,
        }
    }

    /// Delay before the attempt following attempt number `attempt` (1-based)
    ///
    /// Doubles per attempt up to the cap, then jitters down by up to half so
    /// contending sessions spread out instead of thundering in lockstep.
    pub(crate) fn delay(&self, attempt: u32) -> Duration {
        if self.base.is_zero() {
            return Duration::ZERO;
        }
        let shift = attempt.saturating_sub(1).min(16);
        let grown = self.base.saturating_mul(1u32 << shift).min(self.cap);
        grown.mul_f64(rand::thread_rng().gen_range(0.5..1.0))
    }
}

impl Default for Backoff {
    /// 1 ms doubling to a 64 ms cap
    fn default() -> Self {
        Backoff::new(Duration::from_millis(1), Duration::from_millis(64))
    }
}

/// Deadline-bound retry loop for transaction attempts
///
/// ```text
/// INIT → ATTEMPTING → { COMMITTED | REJECTED | (conflict → ATTEMPTING) | TIMED_OUT }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    window: Duration,
    backoff: Backoff,
}

impl RetryPolicy {
    /// Policy with the given operation window and default backoff
    pub fn new(window: Duration) -> Self {
        RetryPolicy {
            window,
            backoff: Backoff::default(),
        }
    }

    /// Replace the backoff
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// The configured operation window
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Drive attempts until one terminates or the deadline passes
    ///
    /// `attempt` runs one full transaction attempt and reports its tagged
    /// outcome. Conflicts restart the loop; rejections and commits return
    /// immediately.
    ///
    /// # Errors
    /// An `Err` from `attempt` (store unavailability, staging failure)
    /// aborts the loop immediately: at this layer a fault is
    /// indistinguishable from a permanent outage, so retrying is the
    /// caller's decision, not ours.
    pub fn run<T, R, F>(&self, mut attempt: F) -> Result<Completion<T, R>>
    where
        F: FnMut() -> Result<Outcome<T, R>>,
    {
        let deadline = Instant::now() + self.window;
        let mut attempts: u32 = 0;

        loop {
            // Strict deadline: checked before every attempt, so none starts
            // at or after the deadline.
            if Instant::now() >= deadline {
                tracing::debug!(attempts, window = ?self.window, "operation deadline elapsed");
                return Ok(Completion::TimedOut(TimedOut {
                    window: self.window,
                    attempts,
                }));
            }

            attempts += 1;
            match attempt()? {
                Outcome::Committed(value) => {
                    tracing::trace!(attempts, "operation committed");
                    return Ok(Completion::Committed(value));
                }
                Outcome::Rejected(reason) => {
                    tracing::debug!(attempts, "operation rejected, not retrying");
                    return Ok(Completion::Rejected(reason));
                }
                Outcome::Conflict => {
                    tracing::debug!(attempt = attempts, "conflict, starting a fresh attempt");
                    let delay = self.backoff.delay(attempts);
                    if !delay.is_zero() {
                        let remaining = deadline.saturating_duration_since(Instant::now());
                        thread::sleep(delay.min(remaining));
                    }
                }
            }
        }
    }
}
