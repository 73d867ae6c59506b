//! In-memory reference store
//!
//! `MemoryStore` implements the [`Store`] trait with:
//! - `parking_lot::RwLock<FxHashMap<Key, Slot>>` for thread-safe access
//! - a per-key modification stamp drawn from a global `AtomicU64` clock
//! - tombstones for deleted keys, so a watched absent key cannot be
//!   recreated and re-deleted without the stamp moving (no ABA window)
//!
//! # Commit protocol
//!
//! Commit validates watched stamps and applies the batch while holding the
//! write lock, so no other session can invalidate a successful validation
//! between the check and the apply. The batch is first applied to cloned
//! staging copies of the touched entries; only a batch that validates
//! end-to-end is moved into the live map. A failing batch therefore applies
//! nothing, and readers never observe a partial batch.
//!
//! # Stamping
//!
//! Every key named by a committed batch receives the same fresh stamp,
//! whether or not its contents actually changed. This is more conservative
//! than dirty-tracking (a no-op removal still invalidates watchers) and
//! keeps the conflict rule easy to state.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use bazaar_core::{EntryKind, Error, Key, Result, Value};

use crate::batch::{WriteBatch, WriteOp};
use crate::entry::Entry;
use crate::traits::Store;
use crate::watch::{CommitOutcome, WatchSet, ABSENT_STAMP};

/// One key's storage cell
///
/// `entry == None` is a tombstone: the key reads as absent but keeps the
/// stamp of the commit that removed it.
#[derive(Debug, Clone)]
struct Slot {
    stamp: u64,
    entry: Option<Entry>,
}

/// In-memory store with watch-based conflict detection
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<FxHashMap<Key, Slot>>,
    clock: AtomicU64,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Current modification stamp of a key
    ///
    /// [`ABSENT_STAMP`] if the key has never been written; tombstoned keys
    /// keep the stamp of the commit that removed them.
    pub fn stamp(&self, key: &Key) -> u64 {
        self.data
            .read()
            .get(key)
            .map_or(ABSENT_STAMP, |slot| slot.stamp)
    }

    /// Highest stamp handed out so far
    pub fn clock(&self) -> u64 {
        self.clock.load(Ordering::SeqCst)
    }

    fn read_entry<T>(
        &self,
        key: &Key,
        f: impl FnOnce(Option<&Entry>) -> Result<T>,
    ) -> Result<T> {
        let data = self.data.read();
        f(data.get(key).and_then(|slot| slot.entry.as_ref()))
    }

    fn wrong_kind(key: &Key, expected: EntryKind, found: &Entry) -> Error {
        Error::WrongKind {
            key: key.clone(),
            expected,
            found: found.kind(),
        }
    }

    /// Apply one staged op to the staging copy of its entry
    ///
    /// Errors here abort the whole commit before the live map is touched.
    fn apply_to_staged(key: &Key, staged: &mut Option<Entry>, op: WriteOp) -> Result<()> {
        match op {
            WriteOp::HashSet { field, value, .. } => {
                match staged.get_or_insert_with(|| Entry::empty(EntryKind::Hash)) {
                    Entry::Hash(fields) => {
                        fields.insert(field, value);
                        Ok(())
                    }
                    other => Err(Self::wrong_kind(key, EntryKind::Hash, other)),
                }
            }
            WriteOp::HashIncr { field, delta, .. } => {
                match staged.get_or_insert_with(|| Entry::empty(EntryKind::Hash)) {
                    Entry::Hash(fields) => {
                        let base = match fields.get(&field) {
                            None => 0,
                            Some(Value::Int(n)) => *n,
                            Some(_) => {
                                return Err(Error::NonNumericField {
                                    key: key.clone(),
                                    field,
                                })
                            }
                        };
                        let adjusted =
                            base.checked_add(delta).ok_or_else(|| Error::NumericOverflow {
                                key: key.clone(),
                                field: field.clone(),
                            })?;
                        fields.insert(field, Value::Int(adjusted));
                        Ok(())
                    }
                    other => Err(Self::wrong_kind(key, EntryKind::Hash, other)),
                }
            }
            WriteOp::SetAdd { member, .. } => {
                match staged.get_or_insert_with(|| Entry::empty(EntryKind::Set)) {
                    Entry::Set(members) => {
                        members.insert(member);
                        Ok(())
                    }
                    other => Err(Self::wrong_kind(key, EntryKind::Set, other)),
                }
            }
            WriteOp::SetRemove { member, .. } => match staged {
                None => Ok(()),
                Some(Entry::Set(members)) => {
                    members.remove(&member);
                    Ok(())
                }
                Some(other) => Err(Self::wrong_kind(key, EntryKind::Set, other)),
            },
            WriteOp::SortedAdd { member, score, .. } => {
                match staged.get_or_insert_with(|| Entry::empty(EntryKind::Sorted)) {
                    Entry::Sorted(members) => {
                        members.insert(member, score);
                        Ok(())
                    }
                    other => Err(Self::wrong_kind(key, EntryKind::Sorted, other)),
                }
            }
            WriteOp::SortedRemove { member, .. } => match staged {
                None => Ok(()),
                Some(Entry::Sorted(members)) => {
                    members.remove(&member);
                    Ok(())
                }
                Some(other) => Err(Self::wrong_kind(key, EntryKind::Sorted, other)),
            },
            WriteOp::Delete { .. } => {
                *staged = None;
                Ok(())
            }
        }
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &Key) -> Result<Option<Entry>> {
        self.read_entry(key, |entry| Ok(entry.cloned()))
    }

    fn get_many(&self, keys: &[Key]) -> Result<FxHashMap<Key, Entry>> {
        // One lock acquisition for the whole multi-read
        let data = self.data.read();
        let mut found = FxHashMap::default();
        for key in keys {
            if let Some(entry) = data.get(key).and_then(|slot| slot.entry.as_ref()) {
                found.insert(key.clone(), entry.clone());
            }
        }
        Ok(found)
    }

    fn kind(&self, key: &Key) -> Result<Option<EntryKind>> {
        self.read_entry(key, |entry| Ok(entry.map(Entry::kind)))
    }

    fn hash_get(&self, key: &Key, field: &str) -> Result<Option<Value>> {
        self.read_entry(key, |entry| match entry {
            None => Ok(None),
            Some(Entry::Hash(fields)) => Ok(fields.get(field).cloned()),
            Some(other) => Err(Self::wrong_kind(key, EntryKind::Hash, other)),
        })
    }

    fn set_contains(&self, key: &Key, member: &str) -> Result<bool> {
        self.read_entry(key, |entry| match entry {
            None => Ok(false),
            Some(Entry::Set(members)) => Ok(members.contains(member)),
            Some(other) => Err(Self::wrong_kind(key, EntryKind::Set, other)),
        })
    }

    fn set_members(&self, key: &Key) -> Result<Vec<String>> {
        self.read_entry(key, |entry| match entry {
            None => Ok(Vec::new()),
            Some(Entry::Set(members)) => Ok(members.iter().cloned().collect()),
            Some(other) => Err(Self::wrong_kind(key, EntryKind::Set, other)),
        })
    }

    fn sorted_score(&self, key: &Key, member: &str) -> Result<Option<i64>> {
        self.read_entry(key, |entry| match entry {
            None => Ok(None),
            Some(Entry::Sorted(members)) => Ok(members.get(member).copied()),
            Some(other) => Err(Self::wrong_kind(key, EntryKind::Sorted, other)),
        })
    }

    fn sorted_range(&self, key: &Key, limit: usize) -> Result<Vec<(String, i64)>> {
        self.read_entry(key, |entry| match entry {
            None => Ok(Vec::new()),
            Some(Entry::Sorted(members)) => {
                let mut ranked: Vec<(String, i64)> = members
                    .iter()
                    .map(|(member, score)| (member.clone(), *score))
                    .collect();
                // Ascending by score, ties broken by member order
                ranked.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
                ranked.truncate(limit);
                Ok(ranked)
            }
            Some(other) => Err(Self::wrong_kind(key, EntryKind::Sorted, other)),
        })
    }

    fn sorted_len(&self, key: &Key) -> Result<usize> {
        self.read_entry(key, |entry| match entry {
            None => Ok(0),
            Some(Entry::Sorted(members)) => Ok(members.len()),
            Some(other) => Err(Self::wrong_kind(key, EntryKind::Sorted, other)),
        })
    }

    fn watch(&self, keys: &[Key]) -> Result<WatchSet> {
        let data = self.data.read();
        Ok(WatchSet::from_stamps(keys.iter().map(|key| {
            let stamp = data.get(key).map_or(ABSENT_STAMP, |slot| slot.stamp);
            (key.clone(), stamp)
        })))
    }

    fn commit(&self, watch: WatchSet, batch: WriteBatch) -> Result<CommitOutcome> {
        // The write lock covers validate and apply: no other commit can slip
        // in between the stamp check and the mutation.
        let mut data = self.data.write();

        for (key, watched) in watch.stamps() {
            let current = data.get(key).map_or(ABSENT_STAMP, |slot| slot.stamp);
            if current != *watched {
                tracing::debug!(key = %key, watched, current, "watched key moved, refusing batch");
                return Ok(CommitOutcome::Conflict { key: key.clone() });
            }
        }

        // Stage against cloned entries so a failing op leaves the map untouched
        let mut staged: FxHashMap<Key, Option<Entry>> = FxHashMap::default();
        for op in batch.into_ops() {
            let key = op.key().clone();
            let entry = staged.entry(key.clone()).or_insert_with(|| {
                data.get(&key).and_then(|slot| slot.entry.clone())
            });
            Self::apply_to_staged(&key, entry, op)?;
        }

        let stamp = self.clock.fetch_add(1, Ordering::SeqCst) + 1;
        for (key, entry) in staged {
            // Emptied containers collapse to tombstones
            let entry = entry.filter(|e| !e.is_empty());
            data.insert(key, Slot { stamp, entry });
        }

        tracing::trace!(stamp, "batch committed");
        Ok(CommitOutcome::Applied { stamp })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> Key {
        Key::new(s)
    }

    /// Commit a batch with no watches; panics on validation failure
    fn apply(store: &MemoryStore, build: impl FnOnce(&mut WriteBatch)) -> u64 {
        let mut batch = WriteBatch::new();
        build(&mut batch);
        match store.commit(WatchSet::empty(), batch).unwrap() {
            CommitOutcome::Applied { stamp } => stamp,
            CommitOutcome::Conflict { key } => panic!("unexpected conflict on {key}"),
        }
    }

    #[test]
    fn get_absent_returns_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get(&key("missing")).unwrap(), None);
        assert_eq!(store.kind(&key("missing")).unwrap(), None);
        assert_eq!(store.stamp(&key("missing")), ABSENT_STAMP);
    }

    #[test]
    fn empty_watch_commit_always_applies() {
        let store = MemoryStore::new();
        let stamp = apply(&store, |b| b.hash_set(key("account:a"), "funds", 100i64));
        assert!(stamp > ABSENT_STAMP);
        assert_eq!(
            store.hash_get(&key("account:a"), "funds").unwrap(),
            Some(Value::Int(100))
        );
    }

    #[test]
    fn all_keys_in_a_batch_share_one_stamp() {
        let store = MemoryStore::new();
        let stamp = apply(&store, |b| {
            b.set_add(key("inventory:s"), "sword");
            b.sorted_add(key("market:listings"), "sword:s", 10);
        });
        assert_eq!(store.stamp(&key("inventory:s")), stamp);
        assert_eq!(store.stamp(&key("market:listings")), stamp);
    }

    #[test]
    fn commit_conflicts_when_watched_key_moves() {
        let store = MemoryStore::new();
        apply(&store, |b| b.set_add(key("inventory:s"), "sword"));

        let watch = store.watch(&[key("inventory:s")]).unwrap();

        // Concurrent mutation of the watched key
        apply(&store, |b| b.set_add(key("inventory:s"), "shield"));

        let mut batch = WriteBatch::new();
        batch.set_remove(key("inventory:s"), "sword");
        let outcome = store.commit(watch, batch).unwrap();
        assert_eq!(
            outcome,
            CommitOutcome::Conflict {
                key: key("inventory:s")
            }
        );
        // Nothing applied: sword still present
        assert!(store.set_contains(&key("inventory:s"), "sword").unwrap());
    }

    #[test]
    fn commit_applies_when_unwatched_keys_move() {
        let store = MemoryStore::new();
        let watch = store.watch(&[key("a")]).unwrap();

        // Unrelated key moves; the watch is unaffected
        apply(&store, |b| b.set_add(key("b"), "x"));

        let mut batch = WriteBatch::new();
        batch.set_add(key("a"), "y");
        assert!(store.commit(watch, batch).unwrap().is_applied());
    }

    #[test]
    fn create_then_delete_still_trips_an_absent_watch() {
        let store = MemoryStore::new();
        let contested = key("contested");

        // Watch captures "never existed"
        let watch = store.watch(&[contested.clone()]).unwrap();
        assert_eq!(watch.stamps()[0].1, ABSENT_STAMP);

        // Another session creates the key, then removes its only member,
        // which collapses the entry to a tombstone
        apply(&store, |b| b.set_add(contested.clone(), "m"));
        apply(&store, |b| b.set_remove(contested.clone(), "m"));
        assert_eq!(store.get(&contested).unwrap(), None);
        assert!(store.stamp(&contested) > ABSENT_STAMP);

        // The key reads as absent again, but the stamp betrays the churn
        let mut batch = WriteBatch::new();
        batch.set_add(contested.clone(), "mine");
        let outcome = store.commit(watch, batch).unwrap();
        assert!(!outcome.is_applied());
    }

    #[test]
    fn wrong_kind_fails_the_whole_batch() {
        let store = MemoryStore::new();
        apply(&store, |b| b.set_add(key("inventory:s"), "sword"));

        let mut batch = WriteBatch::new();
        batch.hash_set(key("account:s"), "funds", 5i64);
        batch.hash_incr(key("inventory:s"), "funds", 1); // set entry, hash op

        let err = store.commit(WatchSet::empty(), batch).unwrap_err();
        assert!(matches!(err, Error::WrongKind { .. }));
        // First op must not have leaked through
        assert_eq!(store.hash_get(&key("account:s"), "funds").unwrap(), None);
    }

    #[test]
    fn in_batch_kind_conflict_is_detected() {
        let store = MemoryStore::new();
        let mut batch = WriteBatch::new();
        batch.hash_set(key("k"), "f", 1i64);
        batch.set_add(key("k"), "m");
        let err = store.commit(WatchSet::empty(), batch).unwrap_err();
        assert!(matches!(
            err,
            Error::WrongKind {
                expected: EntryKind::Set,
                found: EntryKind::Hash,
                ..
            }
        ));
        assert_eq!(store.get(&key("k")).unwrap(), None);
    }

    #[test]
    fn hash_incr_compounds_within_a_batch() {
        let store = MemoryStore::new();
        apply(&store, |b| b.hash_set(key("account:a"), "funds", 10i64));
        apply(&store, |b| {
            b.hash_incr(key("account:a"), "funds", 5);
            b.hash_incr(key("account:a"), "funds", -3);
        });
        assert_eq!(
            store.hash_get(&key("account:a"), "funds").unwrap(),
            Some(Value::Int(12))
        );
    }

    #[test]
    fn hash_incr_starts_missing_fields_at_zero() {
        let store = MemoryStore::new();
        apply(&store, |b| b.hash_incr(key("account:new"), "funds", 7));
        assert_eq!(
            store.hash_get(&key("account:new"), "funds").unwrap(),
            Some(Value::Int(7))
        );
    }

    #[test]
    fn hash_incr_rejects_non_integer_fields() {
        let store = MemoryStore::new();
        apply(&store, |b| b.hash_set(key("account:a"), "funds", "lots"));
        let mut batch = WriteBatch::new();
        batch.hash_incr(key("account:a"), "funds", 1);
        let err = store.commit(WatchSet::empty(), batch).unwrap_err();
        assert!(matches!(err, Error::NonNumericField { .. }));
        // Unchanged
        assert_eq!(
            store.hash_get(&key("account:a"), "funds").unwrap(),
            Some(Value::Str("lots".into()))
        );
    }

    #[test]
    fn hash_incr_detects_overflow() {
        let store = MemoryStore::new();
        apply(&store, |b| b.hash_set(key("a"), "n", i64::MAX));
        let mut batch = WriteBatch::new();
        batch.hash_incr(key("a"), "n", 1);
        let err = store.commit(WatchSet::empty(), batch).unwrap_err();
        assert!(matches!(err, Error::NumericOverflow { .. }));
    }

    #[test]
    fn removing_the_last_member_collapses_the_entry() {
        let store = MemoryStore::new();
        apply(&store, |b| b.set_add(key("inventory:s"), "only"));
        apply(&store, |b| b.set_remove(key("inventory:s"), "only"));
        assert_eq!(store.get(&key("inventory:s")).unwrap(), None);
        assert_eq!(store.kind(&key("inventory:s")).unwrap(), None);
        // After collapse, the key can be reused at any kind
        apply(&store, |b| b.hash_set(key("inventory:s"), "f", 1i64));
        assert_eq!(
            store.kind(&key("inventory:s")).unwrap(),
            Some(EntryKind::Hash)
        );
    }

    #[test]
    fn delete_then_recreate_in_one_batch() {
        let store = MemoryStore::new();
        apply(&store, |b| b.set_add(key("k"), "old"));
        apply(&store, |b| {
            b.delete(key("k"));
            b.hash_set(key("k"), "f", 1i64);
        });
        assert_eq!(store.kind(&key("k")).unwrap(), Some(EntryKind::Hash));
    }

    #[test]
    fn sorted_range_orders_by_score_then_member() {
        let store = MemoryStore::new();
        apply(&store, |b| {
            b.sorted_add(key("market:listings"), "c:s", 5);
            b.sorted_add(key("market:listings"), "a:s", 10);
            b.sorted_add(key("market:listings"), "b:s", 5);
        });
        let ranked = store.sorted_range(&key("market:listings"), 10).unwrap();
        assert_eq!(
            ranked,
            vec![
                ("b:s".to_string(), 5),
                ("c:s".to_string(), 5),
                ("a:s".to_string(), 10)
            ]
        );
        let top = store.sorted_range(&key("market:listings"), 1).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(store.sorted_len(&key("market:listings")).unwrap(), 3);
    }

    #[test]
    fn get_many_returns_only_present_keys() {
        let store = MemoryStore::new();
        apply(&store, |b| b.set_add(key("a"), "x"));
        let found = store
            .get_many(&[key("a"), key("missing")])
            .unwrap();
        assert_eq!(found.len(), 1);
        assert!(found.contains_key(&key("a")));
    }

    #[test]
    fn reads_enforce_entry_kind() {
        let store = MemoryStore::new();
        apply(&store, |b| b.set_add(key("k"), "m"));
        assert!(matches!(
            store.hash_get(&key("k"), "f"),
            Err(Error::WrongKind { .. })
        ));
        assert!(matches!(
            store.sorted_score(&key("k"), "m"),
            Err(Error::WrongKind { .. })
        ));
        // Matching kind works
        assert!(store.set_contains(&key("k"), "m").unwrap());
    }
}
