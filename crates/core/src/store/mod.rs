//! Storage collaborator contracts.
//!
//! The hosted document store is owned by the caller. The ledger and settlement
//! services only see these traits, so any backend (the JSON snapshot used by
//! the CLI, a remote document database, the in-memory [`MemoryStore`]) can sit
//! behind them.

pub mod memory;

use std::future::Future;

use rust_decimal::Decimal;

use crate::error::StoreError;
use crate::inventory::{LotRecord, StockLot};
use crate::settlement::{Customer, OrderKind, SaleRecord, ScheduledOrder};
use crate::types::{LotId, OrderId};

pub use memory::{MemoryStore, Snapshot};

/// Result of asking a collection to flip an order's `paid` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetPaid {
    /// The collection owns the order and it is now paid.
    Updated,
    /// The collection does not hold an order with that ID.
    NotFound,
}

/// Persistence for stock lots.
pub trait LotStore {
    /// List every lot, including exhausted ones.
    fn list_lots(&self) -> impl Future<Output = Result<Vec<StockLot>, StoreError>> + Send;

    /// Create a lot (`id == None`) or fully replace an existing one.
    ///
    /// The store stamps `updated_at`.
    fn upsert_lot(
        &self,
        id: Option<LotId>,
        lot: LotRecord,
    ) -> impl Future<Output = Result<LotId, StoreError>> + Send;

    /// Atomically add `delta` (which may be negative) to a lot's quantity.
    ///
    /// The store stamps `updated_at`.
    fn increment_lot_quantity(
        &self,
        id: LotId,
        delta: Decimal,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Persistence for sales, scheduled orders and customers.
pub trait OrderStore {
    /// List every direct sale.
    fn list_sales(&self) -> impl Future<Output = Result<Vec<SaleRecord>, StoreError>> + Send;

    /// List every scheduled order.
    fn list_scheduled_orders(
        &self,
    ) -> impl Future<Output = Result<Vec<ScheduledOrder>, StoreError>> + Send;

    /// Mark an order in the given collection as paid.
    ///
    /// Marking an already-paid order is a no-op that still reports
    /// [`SetPaid::Updated`].
    fn set_paid(
        &self,
        kind: OrderKind,
        id: &OrderId,
    ) -> impl Future<Output = Result<SetPaid, StoreError>> + Send;

    /// List every customer.
    fn list_customers(&self) -> impl Future<Output = Result<Vec<Customer>, StoreError>> + Send;
}
