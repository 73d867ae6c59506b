//! Trade failure taxonomy
//!
//! Three distinct ways a trade fails, kept apart so callers can react to
//! each correctly:
//!
//! - [`Rejection`]: a business rule said no. Terminal, never retried, and
//!   the store is exactly as it was.
//! - [`TradeError::TimedOut`]: the store was too contended to commit inside
//!   the operation window. The trade may have been valid.
//! - [`TradeError::Store`]: the store itself failed. Fatal for this call;
//!   retrying is the caller's policy decision.
//!
//! Conflicts never appear here — they are retried inside the operation and
//! are invisible unless the deadline also expires.

use bazaar_core::{AccountId, ItemId, Price};
use bazaar_txn::TimedOut;
use std::fmt;
use thiserror::Error;

use crate::keys::Listing;

/// Business-rule rejection of a trade
///
/// Returned as a normal negative result: validation found the trade invalid
/// against the snapshot it read, watches were released, nothing was staged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The seller does not currently hold the item
    ItemNotOwned {
        /// Item that was to be listed
        item: ItemId,
        /// Account that claimed to own it
        seller: AccountId,
    },

    /// The listing is missing or its price differs from what the buyer
    /// agreed to pay
    PriceMismatch {
        /// The listing the buyer asked for
        listing: Listing,
        /// Price the buyer expected to pay
        expected: Price,
        /// Price actually on the listing; None if the listing is gone
        actual: Option<Price>,
    },

    /// The buyer's funds do not cover the price
    InsufficientFunds {
        /// Account attempting the purchase
        buyer: AccountId,
        /// Price of the listing
        required: Price,
        /// Funds the buyer actually holds
        available: Price,
    },

    /// Delisting requested for an item that is not listed
    ListingMissing {
        /// The listing that was to be removed
        listing: Listing,
    },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::ItemNotOwned { item, seller } => {
                write!(f, "item {item} is not in {seller}'s inventory")
            }
            Rejection::PriceMismatch {
                listing,
                expected,
                actual: Some(actual),
            } => {
                write!(
                    f,
                    "listing {listing} is priced at {actual}, buyer expected {expected}"
                )
            }
            Rejection::PriceMismatch {
                listing,
                expected,
                actual: None,
            } => {
                write!(f, "listing {listing} is gone, buyer expected {expected}")
            }
            Rejection::InsufficientFunds {
                buyer,
                required,
                available,
            } => {
                write!(
                    f,
                    "{buyer} holds {available}, listing costs {required}"
                )
            }
            Rejection::ListingMissing { listing } => {
                write!(f, "listing {listing} does not exist")
            }
        }
    }
}

impl std::error::Error for Rejection {}

/// Failure of one ledger operation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TradeError {
    /// Validation rejected the trade (terminal, state unchanged)
    #[error("trade rejected: {0}")]
    Rejected(#[from] Rejection),

    /// The operation window elapsed while every attempt conflicted
    #[error("{0}")]
    TimedOut(TimedOut),

    /// The store failed mid-operation
    #[error(transparent)]
    Store(#[from] bazaar_core::Error),
}

impl TradeError {
    /// The rejection reason, if this failure is a rejection
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            TradeError::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }

    /// Whether the operation timed out rather than being invalid
    pub fn is_timeout(&self) -> bool {
        matches!(self, TradeError::TimedOut(_))
    }
}

impl From<TimedOut> for TradeError {
    fn from(report: TimedOut) -> Self {
        TradeError::TimedOut(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn listing() -> Listing {
        Listing::new(
            ItemId::new("sword").unwrap(),
            AccountId::new("smith").unwrap(),
        )
    }

    #[test]
    fn rejection_messages_name_the_parties() {
        let msg = Rejection::ItemNotOwned {
            item: ItemId::new("sword").unwrap(),
            seller: AccountId::new("smith").unwrap(),
        }
        .to_string();
        assert!(msg.contains("sword"));
        assert!(msg.contains("smith"));

        let msg = Rejection::InsufficientFunds {
            buyer: AccountId::new("pauper").unwrap(),
            required: Price::from_units(10),
            available: Price::from_units(3),
        }
        .to_string();
        assert!(msg.contains("pauper"));
        assert!(msg.contains("10"));
        assert!(msg.contains("3"));
    }

    #[test]
    fn price_mismatch_distinguishes_gone_from_repriced() {
        let repriced = Rejection::PriceMismatch {
            listing: listing(),
            expected: Price::from_units(10),
            actual: Some(Price::from_units(12)),
        };
        assert!(repriced.to_string().contains("12"));

        let gone = Rejection::PriceMismatch {
            listing: listing(),
            expected: Price::from_units(10),
            actual: None,
        };
        assert!(gone.to_string().contains("gone"));
    }

    #[test]
    fn trade_error_classification() {
        let rejected = TradeError::from(Rejection::ListingMissing { listing: listing() });
        assert!(rejected.rejection().is_some());
        assert!(!rejected.is_timeout());

        let timed_out = TradeError::from(TimedOut {
            window: Duration::from_secs(5),
            attempts: 9,
        });
        assert!(timed_out.is_timeout());
        assert!(timed_out.rejection().is_none());

        let store = TradeError::from(bazaar_core::Error::StoreUnavailable("down".into()));
        assert!(!store.is_timeout());
        assert!(store.rejection().is_none());
    }
}
