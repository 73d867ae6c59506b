//! Test doubles for exercising the failure arms of the protocol
//!
//! The in-memory store never fails, which makes the unavailability and
//! perpetual-conflict paths untestable against it directly. These wrappers
//! delegate to an inner store and inject the failure mode under test.
//!
//! They live in the library (not behind `cfg(test)`) so integration tests
//! and downstream crates can drive the same scenarios.

use std::sync::atomic::{AtomicU64, Ordering};

use bazaar_core::{EntryKind, Error, Key, Result, Value};

use crate::batch::WriteBatch;
use crate::entry::Entry;
use crate::traits::Store;
use crate::watch::{CommitOutcome, WatchSet};

/// Store that becomes unavailable after a fixed number of operations
///
/// Every trait call consumes one unit of budget; once the budget is spent,
/// every call fails with `Error::StoreUnavailable`. Useful for asserting
/// that connectivity failures propagate as fatal errors instead of being
/// retried or misread as conflicts.
#[derive(Debug)]
pub struct FailAfter<S> {
    inner: S,
    remaining: AtomicU64,
}

impl<S> FailAfter<S> {
    /// Wrap a store with an operation budget
    pub fn new(inner: S, budget: u64) -> Self {
        FailAfter {
            inner,
            remaining: AtomicU64::new(budget),
        }
    }

    /// The wrapped store
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn spend(&self) -> Result<()> {
        // Saturating decrement: stay at zero once exhausted
        let spent = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if spent {
            Ok(())
        } else {
            Err(Error::StoreUnavailable(
                "operation budget exhausted".to_string(),
            ))
        }
    }
}

impl<S: Store> Store for FailAfter<S> {
    fn get(&self, key: &Key) -> Result<Option<Entry>> {
        self.spend()?;
        self.inner.get(key)
    }

    fn kind(&self, key: &Key) -> Result<Option<EntryKind>> {
        self.spend()?;
        self.inner.kind(key)
    }

    fn hash_get(&self, key: &Key, field: &str) -> Result<Option<Value>> {
        self.spend()?;
        self.inner.hash_get(key, field)
    }

    fn set_contains(&self, key: &Key, member: &str) -> Result<bool> {
        self.spend()?;
        self.inner.set_contains(key, member)
    }

    fn set_members(&self, key: &Key) -> Result<Vec<String>> {
        self.spend()?;
        self.inner.set_members(key)
    }

    fn sorted_score(&self, key: &Key, member: &str) -> Result<Option<i64>> {
        self.spend()?;
        self.inner.sorted_score(key, member)
    }

    fn sorted_range(&self, key: &Key, limit: usize) -> Result<Vec<(String, i64)>> {
        self.spend()?;
        self.inner.sorted_range(key, limit)
    }

    fn sorted_len(&self, key: &Key) -> Result<usize> {
        self.spend()?;
        self.inner.sorted_len(key)
    }

    fn watch(&self, keys: &[Key]) -> Result<WatchSet> {
        self.spend()?;
        self.inner.watch(keys)
    }

    fn commit(&self, watch: WatchSet, batch: WriteBatch) -> Result<CommitOutcome> {
        self.spend()?;
        self.inner.commit(watch, batch)
    }
}

/// Store whose watched commits always conflict
///
/// Reads and empty-watch commits pass straight through (so scenarios can be
/// seeded), but any commit carrying a watch reports the first watched key as
/// changed. Drives the timeout path deterministically: every attempt
/// conflicts until the deadline expires.
#[derive(Debug)]
pub struct AlwaysConflict<S> {
    inner: S,
}

impl<S> AlwaysConflict<S> {
    /// Wrap a store
    pub fn new(inner: S) -> Self {
        AlwaysConflict { inner }
    }

    /// The wrapped store
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: Store> Store for AlwaysConflict<S> {
    fn get(&self, key: &Key) -> Result<Option<Entry>> {
        self.inner.get(key)
    }

    fn kind(&self, key: &Key) -> Result<Option<EntryKind>> {
        self.inner.kind(key)
    }

    fn hash_get(&self, key: &Key, field: &str) -> Result<Option<Value>> {
        self.inner.hash_get(key, field)
    }

    fn set_contains(&self, key: &Key, member: &str) -> Result<bool> {
        self.inner.set_contains(key, member)
    }

    fn set_members(&self, key: &Key) -> Result<Vec<String>> {
        self.inner.set_members(key)
    }

    fn sorted_score(&self, key: &Key, member: &str) -> Result<Option<i64>> {
        self.inner.sorted_score(key, member)
    }

    fn sorted_range(&self, key: &Key, limit: usize) -> Result<Vec<(String, i64)>> {
        self.inner.sorted_range(key, limit)
    }

    fn sorted_len(&self, key: &Key) -> Result<usize> {
        self.inner.sorted_len(key)
    }

    fn watch(&self, keys: &[Key]) -> Result<WatchSet> {
        self.inner.watch(keys)
    }

    fn commit(&self, watch: WatchSet, batch: WriteBatch) -> Result<CommitOutcome> {
        if let Some((key, _)) = watch.stamps().first() {
            return Ok(CommitOutcome::Conflict { key: key.clone() });
        }
        self.inner.commit(watch, batch)
    }
}
