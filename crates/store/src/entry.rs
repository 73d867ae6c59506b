//! Typed container entries
//!
//! Each key holds exactly one container. The three kinds cover what the
//! ledger needs: hashes for account records, sets for inventories, and a
//! score-sorted member table for the market listing structure.

use bazaar_core::{EntryKind, Value};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One container entry in the store
///
/// `BTreeMap`/`BTreeSet` keep iteration deterministic, which makes scan
/// output and test assertions stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Entry {
    /// String fields mapped to scalar values
    Hash(BTreeMap<String, Value>),
    /// Member strings
    Set(BTreeSet<String>),
    /// Member strings with i64 scores
    Sorted(BTreeMap<String, i64>),
}

impl Entry {
    /// Create an empty entry of the given kind
    pub fn empty(kind: EntryKind) -> Entry {
        match kind {
            EntryKind::Hash => Entry::Hash(BTreeMap::new()),
            EntryKind::Set => Entry::Set(BTreeSet::new()),
            EntryKind::Sorted => Entry::Sorted(BTreeMap::new()),
        }
    }

    /// The kind of this entry
    pub fn kind(&self) -> EntryKind {
        match self {
            Entry::Hash(_) => EntryKind::Hash,
            Entry::Set(_) => EntryKind::Set,
            Entry::Sorted(_) => EntryKind::Sorted,
        }
    }

    /// Whether the container holds no fields/members
    ///
    /// Empty entries are collapsed to tombstones after a commit, so an
    /// observable entry is never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Entry::Hash(fields) => fields.is_empty(),
            Entry::Set(members) => members.is_empty(),
            Entry::Sorted(members) => members.is_empty(),
        }
    }

    /// Borrow the hash fields, if this is a hash
    pub fn as_hash(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Entry::Hash(fields) => Some(fields),
            _ => None,
        }
    }

    /// Borrow the set members, if this is a set
    pub fn as_set(&self) -> Option<&BTreeSet<String>> {
        match self {
            Entry::Set(members) => Some(members),
            _ => None,
        }
    }

    /// Borrow the sorted members, if this is a sorted entry
    pub fn as_sorted(&self) -> Option<&BTreeMap<String, i64>> {
        match self {
            Entry::Sorted(members) => Some(members),
            _ => None,
        }
    }
}
