//! Store abstraction for Bazaar
//!
//! This crate defines the key-value store collaborator the transaction
//! protocol runs against:
//!
//! - [`Store`]: the trait surface — reads, watch registration, and atomic
//!   conditional commit
//! - [`Entry`]: the typed containers held under keys (hash, set, sorted)
//! - [`WriteBatch`]: staged writes, applied all-or-nothing at commit
//! - [`WatchSet`]: captured modification stamps for conflict detection
//! - [`MemoryStore`]: the in-process reference implementation
//! - [`testing`]: fault-injection wrappers for exercising the failure arms
//!
//! The contract that everything above is built on: a commit applies its whole
//! batch iff no watched key's stamp moved since `watch` captured it.
//! Otherwise it applies nothing and reports a conflict. Side effects are
//! confined to the commit step; no partial batch is ever observable.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod entry;
pub mod memory;
pub mod testing;
pub mod traits;
pub mod watch;

pub use batch::{WriteBatch, WriteOp};
pub use entry::Entry;
pub use memory::MemoryStore;
pub use traits::Store;
pub use watch::{CommitOutcome, WatchSet};
