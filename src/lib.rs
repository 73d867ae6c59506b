//! Bazaar — optimistic multi-key transactions over a watch-based key-value store
//!
//! The store offers single-command atomicity natively; Bazaar layers a
//! watch / snapshot-read / conditional-commit protocol on top so that
//! multi-key check-and-act operations survive concurrent mutation, and
//! builds a marketplace ledger (list, purchase, delist) on that protocol.
//!
//! # Quick start
//!
//! ```
//! use bazaar::{AccountId, ItemId, Marketplace, MemoryStore, Price};
//!
//! let market = Marketplace::new(MemoryStore::new());
//! let seller = AccountId::new("smith").unwrap();
//! let buyer = AccountId::new("knight").unwrap();
//! let sword = ItemId::new("sword").unwrap();
//!
//! // Accounts and holdings are created out of band
//! market.grant_item(&seller, &sword).unwrap();
//! market.deposit(&buyer, Price::from_units(15)).unwrap();
//!
//! // List, then purchase at the agreed price
//! market.list_item(&sword, &seller, Price::from_units(10)).unwrap();
//! market
//!     .purchase_item(&buyer, &sword, &seller, Price::from_units(10))
//!     .unwrap();
//!
//! assert_eq!(market.funds_of(&buyer).unwrap(), Price::from_units(5));
//! assert_eq!(market.funds_of(&seller).unwrap(), Price::from_units(10));
//! ```
//!
//! # Layering
//!
//! - `bazaar-core`: identifiers, keys, values, money, errors
//! - `bazaar-store`: the [`Store`] trait, [`WriteBatch`], watches, and the
//!   in-memory [`MemoryStore`]
//! - `bazaar-txn`: [`Session`] (one attempt) and [`RetryPolicy`]
//!   (deadline-bound retry)
//! - `bazaar-market`: the [`Marketplace`] ledger

#![warn(missing_docs)]

pub use bazaar_core::{
    AccountId, EntryKind, Error, IdError, ItemId, Key, Price, Result, Value,
};
pub use bazaar_market::{
    DelistReceipt, ListReceipt, Listing, MarketConfig, Marketplace, PurchaseReceipt, Rejection,
    TradeError,
};
pub use bazaar_store::{
    testing, CommitOutcome, Entry, MemoryStore, Store, WatchSet, WriteBatch,
};
pub use bazaar_txn::{Backoff, Completion, Outcome, RetryPolicy, Session, TimedOut};
