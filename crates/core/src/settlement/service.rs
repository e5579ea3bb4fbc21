//! Settlement service: list pending orders and mark them paid.

use std::collections::BTreeMap;

use futures::future::join_all;
use tracing::{debug, info, instrument, warn};

use super::pending::{
    CustomerBalance, build_customer_phone_index, group_by_customer, pending_balances,
    unify_pending_orders,
};
use super::{Customer, OrderKind, OrderRecord, SETTLEMENT_CHAIN};
use crate::error::SettlementError;
use crate::store::{OrderStore, SetPaid};
use crate::types::{CustomerId, OrderId};

type PendingGroups = BTreeMap<CustomerId, Vec<OrderRecord>>;

/// Result of settling one order in a bulk request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementOutcome {
    /// Order that was settled (or not).
    pub order_id: OrderId,
    /// Collection that owned the order, or why settling failed.
    pub result: Result<OrderKind, SettlementError>,
}

/// Per-order outcomes of a bulk settlement, in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkSettlement {
    /// One outcome per requested ID.
    pub outcomes: Vec<SettlementOutcome>,
}

impl BulkSettlement {
    /// Outcomes that succeeded.
    pub fn succeeded(&self) -> impl Iterator<Item = &SettlementOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_ok())
    }

    /// Outcomes that failed.
    pub fn failed(&self) -> impl Iterator<Item = &SettlementOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    /// True when every order was settled.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }
}

/// Reads pending orders and settles them through an [`OrderStore`].
pub struct PendingSettlement<'a, S> {
    store: &'a S,
}

impl<'a, S: OrderStore + Sync> PendingSettlement<'a, S> {
    /// Create a settlement service over a store.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Unpaid orders grouped by resolved customer.
    ///
    /// # Errors
    ///
    /// Returns `SettlementError::Storage` if any listing fails.
    #[instrument(skip(self))]
    pub async fn pending_orders(
        &self,
    ) -> Result<BTreeMap<CustomerId, Vec<OrderRecord>>, SettlementError> {
        let (_, groups) = self.read_pending().await?;
        Ok(groups)
    }

    /// What each customer owes, largest balance first.
    ///
    /// Names and phones come from the same customer read used to resolve the orders.
    ///
    /// # Errors
    ///
    /// Returns `SettlementError::Storage` if any listing fails and
    /// `SettlementError::Overflow` if a balance cannot be summed.
    #[instrument(skip(self))]
    pub async fn balances(&self) -> Result<Vec<CustomerBalance>, SettlementError> {
        let (customers, groups) = self.read_pending().await?;
        pending_balances(groups, &customers)
    }

    async fn read_pending(&self) -> Result<(Vec<Customer>, PendingGroups), SettlementError> {
        let (customers, sales, scheduled) = futures::try_join!(
            self.store.list_customers(),
            self.store.list_sales(),
            self.store.list_scheduled_orders(),
        )?;

        let index = build_customer_phone_index(&customers);
        let orders = unify_pending_orders(sales, scheduled, &index);
        let unresolved = orders.iter().filter(|o| !o.is_resolved()).count();
        if unresolved > 0 {
            debug!(unresolved, "Pending orders without a known customer");
        }

        Ok((customers, group_by_customer(orders)))
    }

    /// Mark one order paid, trying each collection in [`SETTLEMENT_CHAIN`].
    ///
    /// A collection answering "not found" moves on to the next one. Settling
    /// an already-paid order succeeds without changing anything.
    ///
    /// # Errors
    ///
    /// Returns `SettlementError::InvalidArgument` for an empty ID.
    /// Returns `SettlementError::NotFound` if no collection owns the ID.
    /// Returns `SettlementError::Storage` on a transport failure; later
    /// collections are not tried.
    #[instrument(skip(self, id), fields(order_id = %id))]
    pub async fn mark_paid(&self, id: &OrderId) -> Result<OrderKind, SettlementError> {
        if id.is_empty() {
            return Err(SettlementError::InvalidArgument(
                "order id is required".to_string(),
            ));
        }

        for kind in SETTLEMENT_CHAIN {
            match self.store.set_paid(kind, id).await? {
                SetPaid::Updated => {
                    info!(%kind, "Order settled");
                    return Ok(kind);
                }
                SetPaid::NotFound => debug!(%kind, "Order not in collection, trying next"),
            }
        }

        Err(SettlementError::NotFound(id.clone()))
    }

    /// Mark several orders paid, each independently.
    ///
    /// IDs are settled concurrently; a failure on one never stops the others.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn mark_paid_bulk(&self, ids: &[OrderId]) -> BulkSettlement {
        let outcomes = join_all(ids.iter().map(|id| async move {
            SettlementOutcome {
                order_id: id.clone(),
                result: self.mark_paid(id).await,
            }
        }))
        .await;

        let bulk = BulkSettlement { outcomes };
        for failure in bulk.failed() {
            if let Err(err) = &failure.result {
                warn!(order_id = %failure.order_id, error = %err, "Failed to settle order");
            }
        }
        info!(
            settled = bulk.succeeded().count(),
            failed = bulk.failed().count(),
            "Bulk settlement finished"
        );
        bulk
    }
}
