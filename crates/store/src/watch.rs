//! Watch registration and commit outcomes
//!
//! A [`WatchSet`] captures the modification stamp of each watched key at
//! registration time. Commit validates those stamps against the store's
//! current state: any movement means another session touched a watched key,
//! and the batch is refused.
//!
//! Dropping a `WatchSet` without committing releases the watches — that is
//! the unwatch path taken on business-rule rejection.

use bazaar_core::Key;
use smallvec::SmallVec;

/// Stamp recorded for a key that does not exist
///
/// Deleted keys leave tombstones carrying a real stamp, so zero is only ever
/// observed for keys that have never existed. This keeps create-then-delete
/// sequences detectable (no ABA window).
pub const ABSENT_STAMP: u64 = 0;

/// Captured modification stamps for a set of watched keys
///
/// Operations in this system watch one or two keys, so the stamps live
/// inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSet {
    stamps: SmallVec<[(Key, u64); 4]>,
}

impl WatchSet {
    /// A watch set over no keys
    ///
    /// Committing against an empty watch set always applies: it is the
    /// single-command atomicity the store offers natively, used for
    /// out-of-band setup writes.
    pub fn empty() -> Self {
        WatchSet {
            stamps: SmallVec::new(),
        }
    }

    /// Build a watch set from captured `(key, stamp)` pairs
    pub fn from_stamps(stamps: impl IntoIterator<Item = (Key, u64)>) -> Self {
        WatchSet {
            stamps: stamps.into_iter().collect(),
        }
    }

    /// The captured `(key, stamp)` pairs
    pub fn stamps(&self) -> &[(Key, u64)] {
        &self.stamps
    }

    /// Number of watched keys
    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    /// Whether no keys are watched
    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }
}

/// Result of an atomic conditional commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Every watched stamp was unchanged; the whole batch applied
    Applied {
        /// Stamp assigned to every key the batch mutated
        stamp: u64,
    },
    /// A watched key moved; nothing applied
    Conflict {
        /// First watched key found changed
        key: Key,
    },
}

impl CommitOutcome {
    /// Whether the commit applied
    pub fn is_applied(&self) -> bool {
        matches!(self, CommitOutcome::Applied { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_watch_set_is_empty() {
        let watch = WatchSet::empty();
        assert!(watch.is_empty());
        assert_eq!(watch.len(), 0);
    }

    #[test]
    fn from_stamps_preserves_pairs() {
        let watch = WatchSet::from_stamps([
            (Key::new("a"), 3),
            (Key::new("b"), ABSENT_STAMP),
        ]);
        assert_eq!(watch.len(), 2);
        assert_eq!(watch.stamps()[0], (Key::new("a"), 3));
        assert_eq!(watch.stamps()[1].1, ABSENT_STAMP);
    }

    #[test]
    fn outcome_discriminates() {
        assert!(CommitOutcome::Applied { stamp: 1 }.is_applied());
        assert!(!CommitOutcome::Conflict { key: Key::new("k") }.is_applied());
    }
}
