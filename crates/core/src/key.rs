//! Store keys
//!
//! A `Key` addresses exactly one entry in the store. Keys are opaque strings
//! here; the ledger layer builds them through typed constructors so the key
//! layout stays in one place.

use serde::{Deserialize, Serialize};
use std::fmt;

/// String key addressing one entry in the store
///
/// Ordering is plain byte order, which keeps scan output deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(String);

impl Key {
    /// Create a key from any string-like value
    pub fn new(key: impl Into<String>) -> Self {
        Key(key.into())
    }

    /// View the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::new(s)
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key(s)
    }
}
