//! End-to-end scenarios through the facade
//!
//! These exercise the full stack — ledger over retry over session over
//! store — including the two failure modes the in-memory store cannot
//! produce on its own: deterministic timeout (via a store that always
//! conflicts) and mid-operation unavailability (via an operation budget).

use std::time::Duration;

use bazaar::testing::{AlwaysConflict, FailAfter};
use bazaar::{
    AccountId, Backoff, ItemId, MarketConfig, Marketplace, MemoryStore, Price, Rejection, Store,
    TradeError,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::WARN)
        .with_test_writer()
        .try_init();
}

fn acct(name: &str) -> AccountId {
    AccountId::new(name).unwrap()
}

fn item(name: &str) -> ItemId {
    ItemId::new(name).unwrap()
}

#[test]
fn the_canonical_trade() {
    init_tracing();

    // Seller S lists item X at price 10; buyer B with funds 15 purchases at
    // expected price 10.
    let market = Marketplace::new(MemoryStore::new());
    let s = acct("S");
    let b = acct("B");
    let x = item("X");

    market.grant_item(&s, &x).unwrap();
    market.deposit(&b, Price::from_units(15)).unwrap();

    market.list_item(&x, &s, Price::from_units(10)).unwrap();
    assert_eq!(
        market.listing_price(&x, &s).unwrap(),
        Some(Price::from_units(10))
    );
    assert!(market.inventory_of(&s).unwrap().is_empty());

    market
        .purchase_item(&b, &x, &s, Price::from_units(10))
        .unwrap();

    assert_eq!(market.funds_of(&b).unwrap(), Price::from_units(5));
    assert_eq!(market.funds_of(&s).unwrap(), Price::from_units(10));
    assert_eq!(market.inventory_of(&b).unwrap(), vec![x.clone()]);
    assert_eq!(market.listing_price(&x, &s).unwrap(), None);
}

#[test]
fn perpetual_conflict_surfaces_as_timeout_not_success() {
    init_tracing();

    let inner = MemoryStore::new();
    let market = Marketplace::with_config(
        AlwaysConflict::new(inner),
        MarketConfig::new()
            .with_list_window(Duration::from_millis(50))
            .with_backoff(Backoff::none()),
    );
    let seller = acct("smith");
    let sword = item("sword");
    market.grant_item(&seller, &sword).unwrap();

    let err = market
        .list_item(&sword, &seller, Price::from_units(10))
        .unwrap_err();

    match err {
        TradeError::TimedOut(report) => {
            assert_eq!(report.window, Duration::from_millis(50));
            assert!(report.attempts >= 1);
        }
        other => panic!("expected timeout, got {other}"),
    }

    // Nothing committed along the way
    assert!(market
        .store()
        .inner()
        .set_contains(&bazaar::Key::new("inventory:smith"), "sword")
        .unwrap());
    assert_eq!(market.listing_count().unwrap(), 0);
}

#[test]
fn unavailability_is_fatal_not_retried() {
    init_tracing();

    let inner = MemoryStore::new();
    let seeded = Marketplace::new(inner);
    let seller = acct("smith");
    let buyer = acct("knight");
    let sword = item("sword");
    seeded.grant_item(&seller, &sword).unwrap();
    seeded.deposit(&buyer, Price::from_units(50)).unwrap();
    seeded
        .list_item(&sword, &seller, Price::from_units(10))
        .unwrap();

    // Budget covers the watch and the first read, then the store goes dark
    // mid-attempt
    let market = Marketplace::new(FailAfter::new(seeded.into_store(), 2));
    let err = market
        .purchase_item(&buyer, &sword, &seller, Price::from_units(10))
        .unwrap_err();

    match err {
        TradeError::Store(store_err) => assert!(store_err.is_unavailable()),
        other => panic!("expected store failure, got {other}"),
    }

    // The listing is untouched: the dead attempt staged nothing
    assert_eq!(
        market
            .store()
            .inner()
            .sorted_score(&bazaar::Key::new("market:listings"), "sword:smith")
            .unwrap(),
        Some(10)
    );
}

#[test]
fn rejection_beats_timeout_reporting() {
    init_tracing();

    // Even with a generous window and a hot market, an invalid trade is
    // reported as rejected, not timed out — the caller can tell "invalid"
    // from "too contended".
    let market = Marketplace::new(MemoryStore::new());
    let buyer = acct("knight");
    market.deposit(&buyer, Price::from_units(5)).unwrap();

    let err = market
        .purchase_item(&buyer, &item("ghost"), &acct("nobody"), Price::from_units(10))
        .unwrap_err();
    assert!(matches!(
        err,
        TradeError::Rejected(Rejection::PriceMismatch { actual: None, .. })
    ));
    assert!(!err.is_timeout());
}

#[test]
fn relisting_after_delist_round_trips() {
    init_tracing();

    let market = Marketplace::new(MemoryStore::new());
    let seller = acct("smith");
    let sword = item("sword");
    market.grant_item(&seller, &sword).unwrap();

    market.list_item(&sword, &seller, Price::from_units(10)).unwrap();
    market.delist_item(&sword, &seller).unwrap();
    assert_eq!(market.inventory_of(&seller).unwrap(), vec![sword.clone()]);

    // The returned item lists again at a new price
    market.list_item(&sword, &seller, Price::from_units(12)).unwrap();
    assert_eq!(
        market.listing_price(&sword, &seller).unwrap(),
        Some(Price::from_units(12))
    );
}
