//! Entry kind discriminator
//!
//! The store holds typed container entries under string keys. `EntryKind`
//! discriminates the kinds; a staged write that disagrees with the kind
//! already stored under its key fails the whole batch.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of container stored under a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    /// Map of string fields to scalar values (accounts)
    Hash,
    /// Set of member strings (inventories)
    Set,
    /// Members with i64 scores, iterable in score order (listings by price)
    Sorted,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntryKind::Hash => "hash",
            EntryKind::Set => "set",
            EntryKind::Sorted => "sorted",
        };
        f.write_str(name)
    }
}
