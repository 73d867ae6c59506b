//! Optimistic transaction protocol for Bazaar
//!
//! One logical operation against the store runs as a sequence of attempts:
//!
//! ```text
//! RetryPolicy::run
//!   └─ loop (strict deadline check before every attempt)
//!        └─ Session::attempt
//!             1. watch the keys the outcome depends on
//!             2. snapshot-read
//!             3. validate business rules   → Rejected (terminal, unwatch)
//!             4. stage writes
//!             5. atomic conditional commit → Committed | Conflict
//! ```
//!
//! Conflicts are invisible to the caller unless the deadline also expires;
//! rejections and timeouts are ordinary values, not errors. Only store
//! unavailability travels as `Err`, and it aborts the loop immediately.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod outcome;
pub mod retry;
pub mod session;

pub use outcome::{Completion, Outcome, TimedOut};
pub use retry::{Backoff, RetryPolicy};
pub use session::Session;
