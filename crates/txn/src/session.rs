//! One transaction attempt
//!
//! A [`Session`] runs the read-validate-write cycle against a store. The
//! shape mirrors the underlying store contract: watches registered before
//! any read make the later conditional commit refuse the batch if anything
//! watched moved in between, so a committed attempt behaved as if it ran in
//! isolation.

use bazaar_core::{Key, Result};
use bazaar_store::{CommitOutcome, Store, WriteBatch};

use crate::outcome::Outcome;

/// Transaction session over a store
///
/// Holds nothing but the store reference; all per-attempt state (watch set,
/// snapshot, staged batch) lives inside [`Session::attempt`] and dies with
/// it, which is what makes retrying a matter of simply calling again.
#[derive(Debug, Clone, Copy)]
pub struct Session<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: Store + ?Sized> Session<'a, S> {
    /// Create a session over a store
    pub fn new(store: &'a S) -> Self {
        Session { store }
    }

    /// The underlying store
    pub fn store(&self) -> &'a S {
        self.store
    }

    /// Run one read-validate-write attempt
    ///
    /// 1. Registers watches on `watch_keys` — before any read, so every
    ///    modification from here to commit is detectable.
    /// 2. `read` takes a snapshot of whatever the validation and writes
    ///    need. Reads are plain store reads; a concurrent change between
    ///    watch and read is caught at commit, so a *committed* attempt only
    ///    ever acted on consistent data.
    /// 3. `validate` inspects the snapshot. A rejection releases the
    ///    watches and returns `Outcome::Rejected` — terminal, nothing
    ///    staged, nothing written.
    /// 4. `write` stages the batch and produces the attempt's result value.
    /// 5. The conditional commit applies everything or nothing.
    ///
    /// # Errors
    /// Store failures (unavailability, staging validation) propagate as
    /// `Err` and abort the attempt; they are never reported as conflicts.
    pub fn attempt<Snap, T, R>(
        &self,
        watch_keys: &[Key],
        read: impl FnOnce(&S) -> Result<Snap>,
        validate: impl FnOnce(&Snap) -> std::result::Result<(), R>,
        write: impl FnOnce(Snap, &mut WriteBatch) -> T,
    ) -> Result<Outcome<T, R>> {
        let watch = self.store.watch(watch_keys)?;

        let snapshot = read(self.store)?;

        if let Err(reason) = validate(&snapshot) {
            // Dropping the watch set releases the watches without committing
            drop(watch);
            tracing::trace!("validation rejected attempt");
            return Ok(Outcome::Rejected(reason));
        }

        let mut batch = WriteBatch::new();
        let result = write(snapshot, &mut batch);

        match self.store.commit(watch, batch)? {
            CommitOutcome::Applied { stamp } => {
                tracing::trace!(stamp, "attempt committed");
                Ok(Outcome::Committed(result))
            }
            CommitOutcome::Conflict { key } => {
                tracing::debug!(key = %key, "attempt lost its watch");
                Ok(Outcome::Conflict)
            }
        }
    }
}
