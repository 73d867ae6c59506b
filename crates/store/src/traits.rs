//! The store trait
//!
//! `Store` is the seam between the transaction protocol and whatever holds
//! the data. [`crate::MemoryStore`] is the in-process implementation; a
//! networked client would implement the same surface, with every method a
//! blocking round-trip.

use crate::batch::WriteBatch;
use crate::entry::Entry;
use crate::watch::{CommitOutcome, WatchSet};
use bazaar_core::{EntryKind, Key, Result, Value};
use rustc_hash::FxHashMap;

/// Key-value store with watch-based conflict detection
///
/// Thread safety: all methods must be safe to call concurrently from
/// multiple threads (requires Send + Sync). Reads observe whole entries
/// atomically; mutations happen only through [`Store::commit`].
///
/// Every method can fail with `Error::StoreUnavailable`; callers treat that
/// as fatal for the current attempt and never conflate it with a conflict.
pub trait Store: Send + Sync {
    /// Get the whole entry under a key
    ///
    /// Returns None if the key holds nothing.
    ///
    /// # Errors
    /// Returns an error if the store cannot be reached.
    fn get(&self, key: &Key) -> Result<Option<Entry>>;

    /// Get the entries under several keys in one round-trip
    ///
    /// Absent keys are omitted from the result map.
    ///
    /// # Errors
    /// Returns an error if the store cannot be reached.
    fn get_many(&self, keys: &[Key]) -> Result<FxHashMap<Key, Entry>> {
        let mut found = FxHashMap::default();
        for key in keys {
            if let Some(entry) = self.get(key)? {
                found.insert(key.clone(), entry);
            }
        }
        Ok(found)
    }

    /// The container kind currently stored under a key, if any
    fn kind(&self, key: &Key) -> Result<Option<EntryKind>>;

    /// Read one field of a hash entry
    ///
    /// Returns None if the key or the field is absent.
    ///
    /// # Errors
    /// `WrongKind` if the key holds a non-hash entry.
    fn hash_get(&self, key: &Key, field: &str) -> Result<Option<Value>>;

    /// Membership test on a set entry
    ///
    /// An absent key counts as the empty set.
    ///
    /// # Errors
    /// `WrongKind` if the key holds a non-set entry.
    fn set_contains(&self, key: &Key, member: &str) -> Result<bool>;

    /// All members of a set entry, in member order
    ///
    /// # Errors
    /// `WrongKind` if the key holds a non-set entry.
    fn set_members(&self, key: &Key) -> Result<Vec<String>>;

    /// Score of a sorted member
    ///
    /// Returns None if the key or the member is absent.
    ///
    /// # Errors
    /// `WrongKind` if the key holds a non-sorted entry.
    fn sorted_score(&self, key: &Key, member: &str) -> Result<Option<i64>>;

    /// Up to `limit` sorted members, ascending by score (ties by member)
    ///
    /// # Errors
    /// `WrongKind` if the key holds a non-sorted entry.
    fn sorted_range(&self, key: &Key, limit: usize) -> Result<Vec<(String, i64)>>;

    /// Number of members in a sorted entry
    ///
    /// # Errors
    /// `WrongKind` if the key holds a non-sorted entry.
    fn sorted_len(&self, key: &Key) -> Result<usize>;

    /// Begin conflict detection on the given keys
    ///
    /// Captures each key's current modification stamp. Must be called
    /// before the reads whose consistency the commit depends on: a
    /// modification between this capture and [`Store::commit`] makes the
    /// commit refuse the batch.
    ///
    /// # Errors
    /// Returns an error if the store cannot be reached.
    fn watch(&self, keys: &[Key]) -> Result<WatchSet>;

    /// Atomic conditional commit
    ///
    /// Applies the whole batch iff every watched key's stamp is unchanged;
    /// otherwise applies nothing and reports which key moved. All keys the
    /// batch mutates receive the same fresh stamp.
    ///
    /// # Errors
    /// - `StoreUnavailable` if the store cannot be reached
    /// - `WrongKind` / `NonNumericField` / `NumericOverflow` if the batch
    ///   fails staging validation (nothing is applied)
    fn commit(&self, watch: WatchSet, batch: WriteBatch) -> Result<CommitOutcome>;
}
