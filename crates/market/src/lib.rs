//! Marketplace ledger for Bazaar
//!
//! Domain logic for trading items between accounts — list an item for sale,
//! purchase a listed item, delist — expressed purely through the optimistic
//! transaction protocol in `bazaar-txn`. No code path here mutates account,
//! inventory, or listing state outside a committed batch.
//!
//! The ledger maintains three invariants across every committed trade:
//!
//! - **Conservation of funds**: a purchase moves exactly the agreed price
//!   from buyer to seller; the total across all accounts never changes.
//! - **Single ownership**: an item is in exactly one inventory or listed on
//!   the market, never both, never neither.
//! - **Price agreement**: a purchase commits only at the price the buyer
//!   expected and the listing still carries at commit time.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod keys;
pub mod ledger;

pub use config::MarketConfig;
pub use error::{Rejection, TradeError};
pub use keys::Listing;
pub use ledger::{DelistReceipt, ListReceipt, Marketplace, PurchaseReceipt};
