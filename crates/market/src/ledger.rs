//! The marketplace ledger
//!
//! Every trade runs as a deadline-bound optimistic transaction: watch the
//! keys the outcome depends on, read, validate the business rules, stage the
//! writes, commit conditionally, retry on conflict. A committed trade is
//! indistinguishable from one that ran alone against the store.

use std::slice;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use bazaar_core::{AccountId, Error, ItemId, Price, Value};
use bazaar_store::Store;
use bazaar_txn::{Completion, RetryPolicy, Session};

use crate::config::MarketConfig;
use crate::error::{Rejection, TradeError};
use crate::keys::{self, Listing, FUNDS_FIELD};

/// Proof that an item went up for sale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListReceipt {
    /// The listing created
    pub listing: Listing,
    /// Asking price recorded on the listing
    pub price: Price,
}

/// Proof that a purchase settled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    /// The listing that was bought out
    pub listing: Listing,
    /// Account that received the item and paid the price
    pub buyer: AccountId,
    /// Price paid (equals what the listing showed at commit time)
    pub price: Price,
}

/// Proof that a listing was withdrawn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelistReceipt {
    /// The listing removed
    pub listing: Listing,
    /// Price it had been asking
    pub price: Price,
}

/// Snapshot a purchase attempt validates against
struct PurchaseView {
    listed: Option<Price>,
    funds: Price,
}

/// Marketplace ledger over a store
///
/// The store is the sole shared state; a `Marketplace` can be shared across
/// threads freely and every operation behaves as if it executed in
/// isolation.
#[derive(Debug)]
pub struct Marketplace<S> {
    store: S,
    config: MarketConfig,
}

impl<S: Store> Marketplace<S> {
    /// Create a ledger with default configuration
    pub fn new(store: S) -> Self {
        Self::with_config(store, MarketConfig::default())
    }

    /// Create a ledger with explicit configuration
    pub fn with_config(store: S, config: MarketConfig) -> Self {
        Marketplace { store, config }
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Tear down the ledger, returning the store
    pub fn into_store(self) -> S {
        self.store
    }

    /// The active configuration
    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    fn policy(&self, window: Duration) -> RetryPolicy {
        RetryPolicy::new(window).with_backoff(self.config.backoff)
    }

    // ========================================================================
    // Trades
    // ========================================================================

    /// Put an item up for sale at a fixed price
    ///
    /// Watches the seller's inventory: the item must still be there when the
    /// commit lands, otherwise the attempt conflicts and retries. The commit
    /// moves the item out of the inventory and into the market structure in
    /// one step, so the item is never in both places and never in neither.
    ///
    /// # Errors
    /// - `Rejected(ItemNotOwned)` if the seller does not hold the item
    /// - `TimedOut` if contention outlasted the listing window
    /// - `Store` if the store failed mid-operation
    pub fn list_item(
        &self,
        item: &ItemId,
        seller: &AccountId,
        price: Price,
    ) -> Result<ListReceipt, TradeError> {
        let listing = Listing::new(item.clone(), seller.clone());
        let inventory = keys::inventory(seller);
        let session = Session::new(&self.store);

        tracing::debug!(listing = %listing, price = %price, "listing item");

        let completion = self.policy(self.config.list_window).run(|| {
            session.attempt(
                slice::from_ref(&inventory),
                |store| store.set_contains(&inventory, item.as_str()),
                |owned| {
                    if *owned {
                        Ok(())
                    } else {
                        Err(Rejection::ItemNotOwned {
                            item: item.clone(),
                            seller: seller.clone(),
                        })
                    }
                },
                |_, batch| {
                    batch.set_remove(inventory.clone(), item.as_str());
                    batch.sorted_add(keys::market(), listing.member(), price.units());
                    ListReceipt {
                        listing: listing.clone(),
                        price,
                    }
                },
            )
        })?;

        complete(completion)
    }

    /// Buy a listed item at an agreed price
    ///
    /// Watches the market structure and the buyer's account. Validation
    /// checks, in order: the listing still exists at exactly
    /// `expected_price`, then the buyer can afford it. The four writes —
    /// credit seller, debit buyer, hand over the item, drop the listing —
    /// commit atomically or not at all; no half-completed trade is ever
    /// observable, whatever else commits concurrently.
    ///
    /// # Errors
    /// - `Rejected(PriceMismatch)` if the listing is gone or repriced
    /// - `Rejected(InsufficientFunds)` if the buyer cannot pay
    /// - `TimedOut` if contention outlasted the purchase window
    /// - `Store` if the store failed mid-operation
    pub fn purchase_item(
        &self,
        buyer: &AccountId,
        item: &ItemId,
        seller: &AccountId,
        expected_price: Price,
    ) -> Result<PurchaseReceipt, TradeError> {
        let listing = Listing::new(item.clone(), seller.clone());
        let member = listing.member();
        let market = keys::market();
        let buyer_account = keys::account(buyer);
        let seller_account = keys::account(seller);
        let buyer_inventory = keys::inventory(buyer);
        let session = Session::new(&self.store);

        tracing::debug!(listing = %listing, buyer = %buyer, expected = %expected_price, "purchasing item");

        let watch_keys = [market.clone(), buyer_account.clone()];
        let completion = self.policy(self.config.purchase_window).run(|| {
            session.attempt(
                &watch_keys,
                |store| {
                    let listed = match store.sorted_score(&market, &member)? {
                        Some(score) => Some(price_from_score(&listing, score)?),
                        None => None,
                    };
                    let funds = funds_from_value(buyer, store.hash_get(&buyer_account, FUNDS_FIELD)?)?;
                    Ok(PurchaseView { listed, funds })
                },
                |view| {
                    match view.listed {
                        Some(actual) if actual == expected_price => {}
                        other => {
                            return Err(Rejection::PriceMismatch {
                                listing: listing.clone(),
                                expected: expected_price,
                                actual: other,
                            })
                        }
                    }
                    if view.funds < expected_price {
                        return Err(Rejection::InsufficientFunds {
                            buyer: buyer.clone(),
                            required: expected_price,
                            available: view.funds,
                        });
                    }
                    Ok(())
                },
                |_, batch| {
                    batch.hash_incr(seller_account.clone(), FUNDS_FIELD, expected_price.units());
                    batch.hash_incr(buyer_account.clone(), FUNDS_FIELD, -expected_price.units());
                    batch.set_add(buyer_inventory.clone(), item.as_str());
                    batch.sorted_remove(market.clone(), member.clone());
                    PurchaseReceipt {
                        listing: listing.clone(),
                        buyer: buyer.clone(),
                        price: expected_price,
                    }
                },
            )
        })?;

        complete(completion)
    }

    /// Withdraw a listing, returning the item to the seller's inventory
    ///
    /// Watches the market structure; the listing must still exist when the
    /// commit lands. Removal and inventory return are one atomic step.
    ///
    /// # Errors
    /// - `Rejected(ListingMissing)` if the listing does not exist
    /// - `TimedOut` if contention outlasted the listing window
    /// - `Store` if the store failed mid-operation
    pub fn delist_item(
        &self,
        item: &ItemId,
        seller: &AccountId,
    ) -> Result<DelistReceipt, TradeError> {
        let listing = Listing::new(item.clone(), seller.clone());
        let member = listing.member();
        let market = keys::market();
        let inventory = keys::inventory(seller);
        let session = Session::new(&self.store);

        tracing::debug!(listing = %listing, "delisting item");

        let completion = self.policy(self.config.list_window).run(|| {
            session.attempt(
                slice::from_ref(&market),
                |store| {
                    Ok(match store.sorted_score(&market, &member)? {
                        Some(score) => Some(price_from_score(&listing, score)?),
                        None => None,
                    })
                },
                |listed: &Option<Price>| {
                    listed.map(|_| ()).ok_or_else(|| Rejection::ListingMissing {
                        listing: listing.clone(),
                    })
                },
                |listed, batch| {
                    batch.sorted_remove(market.clone(), member.clone());
                    batch.set_add(inventory.clone(), item.as_str());
                    DelistReceipt {
                        listing: listing.clone(),
                        // Validation guaranteed presence
                        price: listed.unwrap_or(Price::ZERO),
                    }
                },
            )
        })?;

        complete(completion)
    }

    // ========================================================================
    // Read views (single snapshot reads, no transaction)
    // ========================================================================

    /// Funds balance of an account; zero if the account record is absent
    ///
    /// # Errors
    /// `Corruption` if the funds field is negative or not an integer.
    pub fn funds_of(&self, account: &AccountId) -> bazaar_core::Result<Price> {
        let value = self.store.hash_get(&keys::account(account), FUNDS_FIELD)?;
        funds_from_value(account, value)
    }

    /// Item ids currently held by an account
    pub fn inventory_of(&self, account: &AccountId) -> bazaar_core::Result<Vec<ItemId>> {
        let members = self.store.set_members(&keys::inventory(account))?;
        members
            .into_iter()
            .map(|member| {
                ItemId::new(member.clone()).map_err(|_| {
                    Error::Corruption(format!(
                        "inventory of {account} holds malformed item id {member:?}"
                    ))
                })
            })
            .collect()
    }

    /// Current asking price of a listing, if it exists
    pub fn listing_price(
        &self,
        item: &ItemId,
        seller: &AccountId,
    ) -> bazaar_core::Result<Option<Price>> {
        let listing = Listing::new(item.clone(), seller.clone());
        match self.store.sorted_score(&keys::market(), &listing.member())? {
            Some(score) => Ok(Some(price_from_score(&listing, score)?)),
            None => Ok(None),
        }
    }

    /// Cheapest-first page of current listings
    pub fn browse(&self, limit: usize) -> bazaar_core::Result<Vec<(Listing, Price)>> {
        let ranked = self.store.sorted_range(&keys::market(), limit)?;
        ranked
            .into_iter()
            .map(|(member, score)| {
                let listing = Listing::parse_member(&member).ok_or_else(|| {
                    Error::Corruption(format!("market holds malformed member {member:?}"))
                })?;
                let price = price_from_score(&listing, score)?;
                Ok((listing, price))
            })
            .collect()
    }

    /// Number of live listings
    pub fn listing_count(&self) -> bazaar_core::Result<usize> {
        self.store.sorted_len(&keys::market())
    }

    // ========================================================================
    // Out-of-band setup
    // ========================================================================
    //
    // Accounts and their holdings are created outside the trade flow. These
    // are empty-watch commits: the store's native single-command atomicity,
    // going through the same commit path as everything else.

    /// Credit an account's funds
    pub fn deposit(&self, account: &AccountId, amount: Price) -> bazaar_core::Result<()> {
        let mut batch = bazaar_store::WriteBatch::new();
        batch.hash_incr(keys::account(account), FUNDS_FIELD, amount.units());
        self.store
            .commit(bazaar_store::WatchSet::empty(), batch)
            .map(drop)
    }

    /// Place an item directly into an account's inventory
    pub fn grant_item(&self, account: &AccountId, item: &ItemId) -> bazaar_core::Result<()> {
        let mut batch = bazaar_store::WriteBatch::new();
        batch.set_add(keys::inventory(account), item.as_str());
        self.store
            .commit(bazaar_store::WatchSet::empty(), batch)
            .map(drop)
    }
}

/// Fold a retry completion into the ledger's result type
fn complete<T>(completion: Completion<T, Rejection>) -> Result<T, TradeError> {
    match completion {
        Completion::Committed(receipt) => Ok(receipt),
        Completion::Rejected(rejection) => Err(TradeError::Rejected(rejection)),
        Completion::TimedOut(report) => Err(TradeError::TimedOut(report)),
    }
}

fn price_from_score(listing: &Listing, score: i64) -> bazaar_core::Result<Price> {
    Price::new(score)
        .ok_or_else(|| Error::Corruption(format!("listing {listing} carries negative price {score}")))
}

fn funds_from_value(account: &AccountId, value: Option<Value>) -> bazaar_core::Result<Price> {
    match value {
        None => Ok(Price::ZERO),
        Some(Value::Int(units)) => Price::new(units).ok_or_else(|| {
            Error::Corruption(format!("account {account} holds negative funds {units}"))
        }),
        Some(other) => Err(Error::Corruption(format!(
            "funds field of {account} holds {} instead of an integer",
            other.type_name()
        ))),
    }
}
