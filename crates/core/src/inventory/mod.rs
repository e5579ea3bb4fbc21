//! Inventory lots: dated batches of stock and their oldest-first consumption.
//!
//! The pure planning functions live in [`plan`]; [`InventoryLedger`] applies
//! their results through a [`LotStore`](crate::store::LotStore).

pub mod ledger;
pub mod plan;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::LotId;

pub use ledger::InventoryLedger;
pub use plan::{LotWrite, available_lots, plan_consumption, plan_merge, summarize};

/// A dated batch of stock for one item name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLot {
    /// Store-assigned lot ID.
    pub id: LotId,
    /// Item name the lot belongs to.
    pub name: String,
    /// Units (or weight) still on hand. Never negative.
    pub quantity: Decimal,
    /// Date the stock was received.
    pub inserted_at: NaiveDate,
    /// Date the stock expires.
    pub expires_at: NaiveDate,
    /// When the store last wrote this lot.
    pub updated_at: DateTime<Utc>,
}

impl StockLot {
    /// Whether the lot still has stock to hand out.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.quantity > Decimal::ZERO
    }

    /// Whether adding stock with this name and expiry merges into this lot.
    #[must_use]
    pub fn merges_with(&self, name: &str, expires_at: NaiveDate) -> bool {
        self.name == name && self.expires_at == expires_at
    }
}

/// The caller-supplied fields of a lot. `updated_at` is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotRecord {
    /// Item name.
    pub name: String,
    /// Quantity received.
    pub quantity: Decimal,
    /// Date received.
    pub inserted_at: NaiveDate,
    /// Expiry date.
    pub expires_at: NaiveDate,
}

/// How an add request touched the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LotChange {
    /// A new lot was created.
    Created(LotId),
    /// An existing lot with the same name and expiry was incremented.
    Merged(LotId),
}

impl LotChange {
    /// The lot that was created or updated.
    #[must_use]
    pub const fn lot_id(&self) -> LotId {
        match self {
            Self::Created(id) | Self::Merged(id) => *id,
        }
    }
}

/// Quantity taken from a single lot while consuming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deduction {
    /// Lot the stock came from.
    pub lot_id: LotId,
    /// Amount deducted from the lot.
    pub amount: Decimal,
    /// Lot quantity after the deduction.
    pub remaining: Decimal,
}

/// Outcome of consuming stock for one name.
///
/// `deducted_total() + unfulfilled == requested` always holds. A non-zero
/// `unfulfilled` means stock ran out; that is reported, not raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionResult {
    /// Item name consumed.
    pub name: String,
    /// Quantity asked for.
    pub requested: Decimal,
    /// Per-lot deductions, oldest lot first.
    pub deductions: Vec<Deduction>,
    /// Quantity that could not be supplied.
    pub unfulfilled: Decimal,
}

impl ConsumptionResult {
    /// Sum of all per-lot deductions.
    #[must_use]
    pub fn deducted_total(&self) -> Decimal {
        self.deductions.iter().map(|d| d.amount).sum()
    }

    /// True when the whole request was covered.
    #[must_use]
    pub fn is_fulfilled(&self) -> bool {
        self.unfulfilled.is_zero()
    }
}

/// Per-name aggregate shown on the inventory page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSummary {
    /// Sum of quantity over every lot with this name.
    pub total_quantity: Decimal,
    /// Earliest expiry among those lots.
    pub nearest_expiry: NaiveDate,
    /// Number of lots aggregated.
    pub lot_count: usize,
}

impl StockSummary {
    /// Whether stock is on hand and the nearest expiry is within `days` of `today`.
    ///
    /// Already-expired stock counts as expiring.
    #[must_use]
    pub fn expires_within(&self, today: NaiveDate, days: i64) -> bool {
        if self.total_quantity <= Decimal::ZERO {
            return false;
        }
        // A window past the calendar's end covers every date.
        TimeDelta::try_days(days)
            .and_then(|window| today.checked_add_signed(window))
            .is_none_or(|limit| self.nearest_expiry <= limit)
    }
}
