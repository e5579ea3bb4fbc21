//! Inventory ledger service.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use super::plan::{self, LotWrite};
use super::{ConsumptionResult, LotChange, LotRecord, StockLot, StockSummary};
use crate::error::LedgerError;
use crate::store::LotStore;

/// Adds, consumes and summarizes stock lots through a [`LotStore`].
///
/// The ledger keeps no state of its own: every call reads the lots, plans
/// against that read and writes the plan back. Callers must serialize calls
/// for the same item name; two concurrent `consume` calls can both plan
/// against the same read.
pub struct InventoryLedger<'a, S> {
    store: &'a S,
}

impl<'a, S: LotStore + Sync> InventoryLedger<'a, S> {
    /// Create a ledger over a store.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Add stock, merging into the lot with the same name and expiry if there is one.
    ///
    /// Exactly one lot is created or incremented.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidArgument` for an empty name or a
    /// non-positive quantity (nothing is written).
    /// Returns `LedgerError::Storage` if the store fails.
    #[instrument(skip(self, input), fields(name = %input.name, quantity = %input.quantity))]
    pub async fn add_or_merge_lot(&self, input: LotRecord) -> Result<LotChange, LedgerError> {
        let lots = self.store.list_lots().await?;

        match plan::plan_merge(&lots, &input)? {
            LotWrite::Increment { lot_id, delta } => {
                self.store.increment_lot_quantity(lot_id, delta).await?;
                info!(lot_id = %lot_id, "Merged stock into existing lot");
                Ok(LotChange::Merged(lot_id))
            }
            LotWrite::Create(record) => {
                let lot_id = self.store.upsert_lot(None, record).await?;
                info!(lot_id = %lot_id, "Created lot");
                Ok(LotChange::Created(lot_id))
            }
        }
    }

    /// Consume stock oldest lot first.
    ///
    /// Running out of stock is not an error: the result's `unfulfilled` field
    /// carries the shortfall.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidArgument` if `requested` is not positive.
    /// Returns `LedgerError::Storage` if the store fails; deductions written
    /// before the failure stay written.
    #[instrument(skip(self))]
    pub async fn consume(
        &self,
        name: &str,
        requested: Decimal,
    ) -> Result<ConsumptionResult, LedgerError> {
        let lots = self.store.list_lots().await?;
        let result = plan::plan_consumption(&lots, name, requested)?;

        for deduction in &result.deductions {
            self.store
                .increment_lot_quantity(deduction.lot_id, -deduction.amount)
                .await?;
        }

        if result.is_fulfilled() {
            info!(lots = result.deductions.len(), "Consumed stock");
        } else {
            warn!(
                deducted = %result.deducted_total(),
                unfulfilled = %result.unfulfilled,
                "Not enough stock to cover request"
            );
        }

        Ok(result)
    }

    /// Per-name totals and nearest expiry.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::QuantityOverflow` if one name's lots sum past the
    /// representable range.
    /// Returns `LedgerError::Storage` if the store fails.
    #[instrument(skip(self))]
    pub async fn summarize(&self) -> Result<BTreeMap<String, StockSummary>, LedgerError> {
        let lots = self.store.list_lots().await?;
        plan::summarize(&lots)
    }

    /// Lots for `name` that still hold stock, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Storage` if the store fails.
    #[instrument(skip(self))]
    pub async fn available(&self, name: &str) -> Result<Vec<StockLot>, LedgerError> {
        let lots = self.store.list_lots().await?;
        Ok(plan::available_lots(&lots, name))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::error::StoreError;
    use crate::store::MemoryStore;
    use crate::types::LotId;

    fn record(name: &str, quantity: Decimal, inserted: (u32, u32), expires: (u32, u32)) -> LotRecord {
        LotRecord {
            name: name.to_string(),
            quantity,
            inserted_at: NaiveDate::from_ymd_opt(2024, inserted.0, inserted.1).unwrap(),
            expires_at: NaiveDate::from_ymd_opt(2024, expires.0, expires.1).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_add_then_merge() {
        let store = MemoryStore::new();
        let ledger = InventoryLedger::new(&store);

        let first = ledger
            .add_or_merge_lot(record("Y", dec!(2), (1, 1), (2, 1)))
            .await
            .unwrap();
        let second = ledger
            .add_or_merge_lot(record("Y", dec!(3), (1, 9), (2, 1)))
            .await
            .unwrap();

        assert_eq!(first, LotChange::Created(LotId::new(1)));
        assert_eq!(second, LotChange::Merged(LotId::new(1)));

        let lots = store.list_lots().await.unwrap();
        assert_eq!(lots.len(), 1);
        assert_eq!(lots[0].quantity, dec!(5));
    }

    #[tokio::test]
    async fn test_invalid_add_writes_nothing() {
        let store = MemoryStore::new();
        let ledger = InventoryLedger::new(&store);

        let err = ledger
            .add_or_merge_lot(record("Y", dec!(-1), (1, 1), (2, 1)))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidArgument(_)));
        assert!(store.list_lots().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_consume_updates_store() {
        let store = MemoryStore::new();
        let ledger = InventoryLedger::new(&store);
        ledger
            .add_or_merge_lot(record("X", dec!(3), (1, 1), (3, 1)))
            .await
            .unwrap();
        ledger
            .add_or_merge_lot(record("X", dec!(5), (1, 5), (3, 5)))
            .await
            .unwrap();

        let result = ledger.consume("X", dec!(4)).await.unwrap();
        assert!(result.is_fulfilled());

        let lots = store.list_lots().await.unwrap();
        assert_eq!(lots[0].quantity, Decimal::ZERO);
        assert_eq!(lots[1].quantity, dec!(4));

        let available = ledger.available("X").await.unwrap();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, lots[1].id);
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let store = MemoryStore::new();
        store.set_unavailable(true).unwrap();
        let ledger = InventoryLedger::new(&store);

        let err = ledger.consume("X", dec!(1)).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Storage(StoreError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_summarize_through_store() {
        let store = MemoryStore::new();
        let ledger = InventoryLedger::new(&store);
        ledger
            .add_or_merge_lot(record("X", dec!(3), (1, 1), (3, 1)))
            .await
            .unwrap();
        ledger
            .add_or_merge_lot(record("X", dec!(2), (1, 2), (2, 14)))
            .await
            .unwrap();

        let summary = ledger.summarize().await.unwrap();
        assert_eq!(summary["X"].total_quantity, dec!(5));
        assert_eq!(
            summary["X"].nearest_expiry,
            NaiveDate::from_ymd_opt(2024, 2, 14).unwrap()
        );
    }

    #[tokio::test]
    async fn test_overflowing_merge_is_rejected() {
        let store = MemoryStore::new();
        let ledger = InventoryLedger::new(&store);
        ledger
            .add_or_merge_lot(record("Y", Decimal::MAX, (1, 1), (2, 1)))
            .await
            .unwrap();

        let err = ledger
            .add_or_merge_lot(record("Y", Decimal::MAX, (1, 2), (2, 1)))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidArgument(_)));

        // The store is still usable and the lot is unchanged.
        let lots = store.list_lots().await.unwrap();
        assert_eq!(lots.len(), 1);
        assert_eq!(lots[0].quantity, Decimal::MAX);
        assert!(ledger.consume("Y", dec!(1)).await.unwrap().is_fulfilled());
    }
}
