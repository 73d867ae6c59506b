//! Attempt and operation outcomes
//!
//! Each attempt reports exactly one of three results, and the retry loop
//! folds a stream of attempts into a final completion. Keeping these as
//! tagged enums (rather than driving retry off caught errors) is what lets
//! the loop tell a concurrency conflict apart from a business rejection:
//! the first is retried, the second never is.

use std::fmt;
use std::time::Duration;

/// Result of one transaction attempt
///
/// Generic over the commit result `T` and the rejection reason `R` — the
/// protocol never learns the caller's business vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T, R> {
    /// The batch committed; every staged write applied atomically
    Committed(T),
    /// A watched key changed between watch and commit; nothing applied.
    /// Retried by the policy, invisible to the caller.
    Conflict,
    /// A business rule failed during validation; nothing staged, watches
    /// released. Terminal — never retried.
    Rejected(R),
}

impl<T, R> Outcome<T, R> {
    /// Whether this attempt committed
    pub fn is_committed(&self) -> bool {
        matches!(self, Outcome::Committed(_))
    }

    /// Whether this attempt hit a conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, Outcome::Conflict)
    }
}

/// Deadline expiry report
///
/// Carries enough for a caller to tell "too contended to finish in time"
/// apart from "invalid": the window that elapsed and how many attempts ran
/// inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedOut {
    /// The configured operation window
    pub window: Duration,
    /// Attempts started before the deadline
    pub attempts: u32,
}

impl fmt::Display for TimedOut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "deadline of {:?} elapsed after {} attempt(s)",
            self.window, self.attempts
        )
    }
}

/// Final result of a deadline-bound operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion<T, R> {
    /// An attempt committed before the deadline
    Committed(T),
    /// An attempt was rejected by a business rule (returned immediately)
    Rejected(R),
    /// The deadline elapsed while every attempt conflicted
    TimedOut(TimedOut),
}

impl<T, R> Completion<T, R> {
    /// Whether the operation committed
    pub fn is_committed(&self) -> bool {
        matches!(self, Completion::Committed(_))
    }

    /// Extract the committed value, if any
    pub fn committed(self) -> Option<T> {
        match self {
            Completion::Committed(value) => Some(value),
            _ => None,
        }
    }
}
