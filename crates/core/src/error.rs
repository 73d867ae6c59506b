//! Error types for the store layer
//!
//! This module defines the errors a store operation can surface.
//! We use `thiserror` for automatic `Display` and `Error` trait
//! implementations.
//!
//! Conflicts and business-rule rejections are NOT errors: they are ordinary
//! outcomes of a transaction attempt and travel through the `Outcome` enum in
//! `bazaar-txn`. Everything here is a genuine fault — the caller cannot make
//! progress by retrying the same attempt.

use crate::entry_kind::EntryKind;
use crate::key::Key;
use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for store operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// The store cannot be reached (connectivity failure mid-attempt).
    ///
    /// Never silently retried by the transaction protocol: at this layer it
    /// is indistinguishable from a permanent outage, so it propagates as a
    /// fatal error and the caller's own policy decides what to do.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// An operation addressed an entry of the wrong container kind
    #[error("wrong kind for {key}: expected {expected}, found {found}")]
    WrongKind {
        /// Key the operation addressed
        key: Key,
        /// Kind the operation requires
        expected: EntryKind,
        /// Kind currently stored under the key
        found: EntryKind,
    },

    /// A numeric adjustment addressed a hash field that is not an integer
    #[error("field {field:?} of {key} is not an integer")]
    NonNumericField {
        /// Key of the hash entry
        key: Key,
        /// Field the adjustment addressed
        field: String,
    },

    /// A numeric adjustment overflowed the i64 range
    #[error("integer overflow adjusting field {field:?} of {key}")]
    NumericOverflow {
        /// Key of the hash entry
        key: Key,
        /// Field the adjustment addressed
        field: String,
    },

    /// Stored data violates an invariant the caller relies on
    #[error("data corruption: {0}")]
    Corruption(String),
}

impl Error {
    /// Check whether this error reports store unavailability
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Error::StoreUnavailable(_))
    }
}
