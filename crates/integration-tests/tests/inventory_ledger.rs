//! Integration tests for the inventory ledger.
//!
//! These run the ledger against the in-memory store and check the behaviour
//! the inventory page depends on: merge identity, oldest-first consumption,
//! partial fulfilment and conservation of quantity.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use trailer_core::InventoryLedger;
use trailer_core::inventory::LotChange;
use trailer_core::store::{LotStore, MemoryStore};
use trailer_core::{LedgerError, LotId};
use trailer_integration_tests::{date, lot};

// =============================================================================
// Merge Tests
// =============================================================================

#[tokio::test]
async fn test_same_expiry_merges_into_one_lot() {
    let store = MemoryStore::new();
    let ledger = InventoryLedger::new(&store);

    ledger
        .add_or_merge_lot(lot("Y", dec!(2), "2024-01-01", "2024-02-01"))
        .await
        .unwrap();
    let change = ledger
        .add_or_merge_lot(lot("Y", dec!(3), "2024-01-10", "2024-02-01"))
        .await
        .unwrap();

    assert!(matches!(change, LotChange::Merged(_)));
    let lots = store.list_lots().await.unwrap();
    assert_eq!(lots.len(), 1);
    assert_eq!(lots[0].quantity, dec!(5));
    // The original received date is kept.
    assert_eq!(lots[0].inserted_at, date("2024-01-01"));
}

#[tokio::test]
async fn test_different_expiry_creates_new_lot() {
    let store = MemoryStore::new();
    let ledger = InventoryLedger::new(&store);

    ledger
        .add_or_merge_lot(lot("Y", dec!(2), "2024-01-01", "2024-02-01"))
        .await
        .unwrap();
    ledger
        .add_or_merge_lot(lot("Y", dec!(3), "2024-01-01", "2024-02-02"))
        .await
        .unwrap();

    assert_eq!(store.list_lots().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_add_touches_only_one_lot() {
    let store = MemoryStore::new();
    let ledger = InventoryLedger::new(&store);

    ledger
        .add_or_merge_lot(lot("A", dec!(1), "2024-01-01", "2024-02-01"))
        .await
        .unwrap();
    ledger
        .add_or_merge_lot(lot("B", dec!(1), "2024-01-01", "2024-02-01"))
        .await
        .unwrap();
    let before = store.list_lots().await.unwrap();

    ledger
        .add_or_merge_lot(lot("B", dec!(4), "2024-01-02", "2024-02-01"))
        .await
        .unwrap();
    let after = store.list_lots().await.unwrap();

    assert_eq!(before[0], after[0]);
    assert_eq!(after[1].quantity, dec!(5));
}

#[tokio::test]
async fn test_non_positive_quantity_rejected() {
    let store = MemoryStore::new();
    let ledger = InventoryLedger::new(&store);

    for quantity in [Decimal::ZERO, dec!(-2)] {
        let err = ledger
            .add_or_merge_lot(lot("Y", quantity, "2024-01-01", "2024-02-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidArgument(_)));
    }
    assert!(ledger.consume("Y", Decimal::ZERO).await.is_err());
    assert!(store.list_lots().await.unwrap().is_empty());
}

// =============================================================================
// Consumption Tests
// =============================================================================

#[tokio::test]
async fn test_fifo_order() {
    let store = MemoryStore::new();
    let ledger = InventoryLedger::new(&store);

    // Inserted out of order on purpose: B first, then the older A.
    ledger
        .add_or_merge_lot(lot("X", dec!(5), "2024-01-05", "2024-03-05"))
        .await
        .unwrap();
    ledger
        .add_or_merge_lot(lot("X", dec!(3), "2024-01-01", "2024-03-01"))
        .await
        .unwrap();

    let result = ledger.consume("X", dec!(4)).await.unwrap();

    let b = LotId::new(1);
    let a = LotId::new(2);
    assert_eq!(result.deductions.len(), 2);
    assert_eq!((result.deductions[0].lot_id, result.deductions[0].amount), (a, dec!(3)));
    assert_eq!((result.deductions[1].lot_id, result.deductions[1].amount), (b, dec!(1)));

    let lots = store.list_lots().await.unwrap();
    let quantity = |id: LotId| lots.iter().find(|l| l.id == id).unwrap().quantity;
    assert_eq!(quantity(a), Decimal::ZERO);
    assert_eq!(quantity(b), dec!(4));
}

#[tokio::test]
async fn test_partial_fulfillment() {
    let store = MemoryStore::new();
    let ledger = InventoryLedger::new(&store);
    ledger
        .add_or_merge_lot(lot("X", dec!(4), "2024-01-01", "2024-03-01"))
        .await
        .unwrap();

    let result = ledger.consume("X", dec!(100)).await.unwrap();

    assert_eq!(result.deducted_total(), dec!(4));
    assert_eq!(result.unfulfilled, dec!(96));
    assert!(!result.is_fulfilled());
}

#[tokio::test]
async fn test_unknown_name_is_all_unfulfilled() {
    let store = MemoryStore::new();
    let ledger = InventoryLedger::new(&store);

    let result = ledger.consume("nothing", dec!(7)).await.unwrap();
    assert!(result.deductions.is_empty());
    assert_eq!(result.unfulfilled, dec!(7));
}

#[tokio::test]
async fn test_exhausted_lots_stay_addressable() {
    let store = MemoryStore::new();
    let ledger = InventoryLedger::new(&store);
    ledger
        .add_or_merge_lot(lot("X", dec!(2), "2024-01-01", "2024-03-01"))
        .await
        .unwrap();

    ledger.consume("X", dec!(2)).await.unwrap();

    assert_eq!(store.list_lots().await.unwrap().len(), 1);
    assert!(ledger.available("X").await.unwrap().is_empty());

    // Restocking with the same expiry revives the same lot.
    let change = ledger
        .add_or_merge_lot(lot("X", dec!(1), "2024-01-09", "2024-03-01"))
        .await
        .unwrap();
    assert_eq!(change, LotChange::Merged(LotId::new(1)));
}

#[tokio::test]
async fn test_no_lot_goes_negative() {
    let store = MemoryStore::new();
    let ledger = InventoryLedger::new(&store);
    ledger
        .add_or_merge_lot(lot("X", dec!(1.5), "2024-01-01", "2024-03-01"))
        .await
        .unwrap();
    ledger
        .add_or_merge_lot(lot("X", dec!(0.25), "2024-01-02", "2024-03-02"))
        .await
        .unwrap();

    for _ in 0..5 {
        ledger.consume("X", dec!(0.5)).await.unwrap();
    }

    for stored in store.list_lots().await.unwrap() {
        assert!(stored.quantity >= Decimal::ZERO, "lot {} went negative", stored.id);
    }
}

// =============================================================================
// Conservation Tests
// =============================================================================

#[tokio::test]
async fn test_conservation_over_mixed_sequence() {
    let store = MemoryStore::new();
    let ledger = InventoryLedger::new(&store);

    let mut added = Decimal::ZERO;
    let mut consumed = Decimal::ZERO;

    let adds = [
        (dec!(10), "2024-01-01", "2024-02-01"),
        (dec!(4), "2024-01-03", "2024-02-01"),
        (dec!(2.5), "2024-01-04", "2024-02-10"),
        (dec!(6), "2024-01-08", "2024-02-20"),
    ];
    let consumes = [dec!(3), dec!(9.5), dec!(1), dec!(50)];

    for ((quantity, inserted, expires), request) in adds.into_iter().zip(consumes) {
        ledger
            .add_or_merge_lot(lot("X", quantity, inserted, expires))
            .await
            .unwrap();
        added += quantity;

        let result = ledger.consume("X", request).await.unwrap();
        assert_eq!(result.deducted_total() + result.unfulfilled, request);
        consumed += result.deducted_total();

        let summary = ledger.summarize().await.unwrap();
        assert_eq!(summary["X"].total_quantity, added - consumed);
    }
}

#[tokio::test]
async fn test_summary_nearest_expiry() {
    let store = MemoryStore::new();
    let ledger = InventoryLedger::new(&store);
    ledger
        .add_or_merge_lot(lot("X", dec!(1), "2024-01-01", "2024-03-10"))
        .await
        .unwrap();
    ledger
        .add_or_merge_lot(lot("X", dec!(1), "2024-01-02", "2024-02-15"))
        .await
        .unwrap();
    ledger
        .add_or_merge_lot(lot("Z", dec!(1), "2024-01-02", "2024-05-01"))
        .await
        .unwrap();

    let summary = ledger.summarize().await.unwrap();
    assert_eq!(summary.len(), 2);
    assert_eq!(summary["X"].nearest_expiry, date("2024-02-15"));
    assert!(summary["X"].expires_within(date("2024-02-13"), 3));
    assert!(!summary["Z"].expires_within(date("2024-02-13"), 3));
}
