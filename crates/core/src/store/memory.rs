//! In-memory store backed by a [`Snapshot`].
//!
//! Used by tests and by the CLI, which loads a snapshot from disk, runs one
//! command against it and writes it back.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{LotStore, OrderStore, SetPaid};
use crate::error::StoreError;
use crate::inventory::{LotRecord, StockLot};
use crate::settlement::{Customer, OrderKind, SaleRecord, ScheduledOrder};
use crate::types::{LotId, OrderId};

/// Everything the store holds, in a serializable form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Stock lots.
    #[serde(default)]
    pub lots: Vec<StockLot>,
    /// Direct sales.
    #[serde(default)]
    pub sales: Vec<SaleRecord>,
    /// Scheduled orders.
    #[serde(default)]
    pub scheduled_orders: Vec<ScheduledOrder>,
    /// Customers.
    #[serde(default)]
    pub customers: Vec<Customer>,
}

#[derive(Debug, Default)]
struct State {
    lots: BTreeMap<LotId, StockLot>,
    sales: Vec<SaleRecord>,
    scheduled_orders: Vec<ScheduledOrder>,
    customers: Vec<Customer>,
    unavailable: bool,
    failing_set_paid: HashSet<(OrderKind, OrderId)>,
}

impl State {
    fn next_lot_id(&self) -> Result<LotId, StoreError> {
        match self.lots.last_key_value() {
            None => Ok(LotId::new(1)),
            Some((id, _)) => id
                .as_i32()
                .checked_add(1)
                .map(LotId::new)
                .ok_or_else(|| StoreError::Overflow(format!("no lot id left after {id}"))),
        }
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable("store is offline".to_string()));
        }
        Ok(())
    }
}

/// A [`LotStore`] and [`OrderStore`] held entirely in memory.
///
/// Failures can be injected with [`MemoryStore::set_unavailable`] and
/// [`MemoryStore::fail_set_paid`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the contents of a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] if two lots share an ID or a lot has a
    /// negative quantity.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, StoreError> {
        let mut lots = BTreeMap::new();
        for lot in snapshot.lots {
            if lot.quantity.is_sign_negative() && !lot.quantity.is_zero() {
                return Err(StoreError::Corrupt(format!(
                    "lot {} has negative quantity {}",
                    lot.id, lot.quantity
                )));
            }
            if let Some(dup) = lots.insert(lot.id, lot) {
                return Err(StoreError::Corrupt(format!("duplicate lot id {}", dup.id)));
            }
        }

        Ok(Self {
            state: Mutex::new(State {
                lots,
                sales: snapshot.sales,
                scheduled_orders: snapshot.scheduled_orders,
                customers: snapshot.customers,
                ..State::default()
            }),
        })
    }

    /// Copy the current contents out.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the lock is poisoned.
    pub fn snapshot(&self) -> Result<Snapshot, StoreError> {
        let state = self.lock()?;
        Ok(Snapshot {
            lots: state.lots.values().cloned().collect(),
            sales: state.sales.clone(),
            scheduled_orders: state.scheduled_orders.clone(),
            customers: state.customers.clone(),
        })
    }

    /// Simulate the backend going offline (or coming back).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the lock is poisoned.
    pub fn set_unavailable(&self, unavailable: bool) -> Result<(), StoreError> {
        self.lock()?.unavailable = unavailable;
        Ok(())
    }

    /// Make every `set_paid` call for this collection and ID fail with a transport error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the lock is poisoned.
    pub fn fail_set_paid(&self, kind: OrderKind, id: OrderId) -> Result<(), StoreError> {
        self.lock()?.failing_set_paid.insert((kind, id));
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }
}

impl LotStore for MemoryStore {
    async fn list_lots(&self) -> Result<Vec<StockLot>, StoreError> {
        let state = self.lock()?;
        state.check_available()?;
        Ok(state.lots.values().cloned().collect())
    }

    async fn upsert_lot(&self, id: Option<LotId>, lot: LotRecord) -> Result<LotId, StoreError> {
        let mut state = self.lock()?;
        state.check_available()?;

        let id = match id {
            Some(id) => id,
            None => state.next_lot_id()?,
        };
        state.lots.insert(
            id,
            StockLot {
                id,
                name: lot.name,
                quantity: lot.quantity,
                inserted_at: lot.inserted_at,
                expires_at: lot.expires_at,
                updated_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn increment_lot_quantity(&self, id: LotId, delta: Decimal) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        state.check_available()?;

        let lot = state.lots.get_mut(&id).ok_or(StoreError::MissingLot(id))?;
        let current = lot.quantity;
        lot.quantity = current
            .checked_add(delta)
            .ok_or_else(|| StoreError::Overflow(format!("lot {id} quantity {current} + {delta}")))?;
        lot.updated_at = Utc::now();
        Ok(())
    }
}

impl OrderStore for MemoryStore {
    async fn list_sales(&self) -> Result<Vec<SaleRecord>, StoreError> {
        let state = self.lock()?;
        state.check_available()?;
        Ok(state.sales.clone())
    }

    async fn list_scheduled_orders(&self) -> Result<Vec<ScheduledOrder>, StoreError> {
        let state = self.lock()?;
        state.check_available()?;
        Ok(state.scheduled_orders.clone())
    }

    async fn set_paid(&self, kind: OrderKind, id: &OrderId) -> Result<SetPaid, StoreError> {
        let mut state = self.lock()?;
        state.check_available()?;

        if state.failing_set_paid.contains(&(kind, id.clone())) {
            return Err(StoreError::Unavailable(format!(
                "write to {kind} collection timed out"
            )));
        }

        let paid = match kind {
            OrderKind::Sale => state
                .sales
                .iter_mut()
                .find(|sale| &sale.id == id)
                .map(|sale| &mut sale.paid),
            OrderKind::Scheduled => state
                .scheduled_orders
                .iter_mut()
                .find(|order| &order.id == id)
                .map(|order| &mut order.paid),
        };

        Ok(paid.map_or(SetPaid::NotFound, |flag| {
            *flag = true;
            SetPaid::Updated
        }))
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, StoreError> {
        let state = self.lock()?;
        state.check_available()?;
        Ok(state.customers.clone())
    }
}
