//! Pure planning over a snapshot of lots.
//!
//! Nothing here touches storage. Each function takes the lots as they were
//! read and returns what should be written back.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::{ConsumptionResult, Deduction, LotRecord, StockLot, StockSummary};
use crate::error::LedgerError;
use crate::types::{LotId, require_positive};

/// The single write produced by adding stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LotWrite {
    /// Increment an existing lot with the same name and expiry.
    Increment {
        /// Lot to increment.
        lot_id: LotId,
        /// Amount to add.
        delta: Decimal,
    },
    /// Create a new lot.
    Create(LotRecord),
}

/// Decide whether new stock merges into an existing lot or starts a new one.
///
/// Lots are keyed by `(name, expires_at)` with exact equality. When several
/// lots share the key (which only happens with data written outside the
/// ledger) the lowest lot ID receives the increment.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidArgument`] for an empty name, a
/// non-positive quantity, or an increment the lot's quantity cannot hold.
pub fn plan_merge(lots: &[StockLot], input: &LotRecord) -> Result<LotWrite, LedgerError> {
    if input.name.trim().is_empty() {
        return Err(LedgerError::InvalidArgument("name is required".to_string()));
    }
    let delta = require_positive("quantity", input.quantity)?;

    let existing = lots
        .iter()
        .filter(|lot| lot.merges_with(&input.name, input.expires_at))
        .min_by_key(|lot| lot.id);

    match existing {
        Some(lot) => {
            if lot.quantity.checked_add(delta).is_none() {
                return Err(LedgerError::InvalidArgument(format!(
                    "adding {delta} to lot {} would overflow its quantity",
                    lot.id
                )));
            }
            Ok(LotWrite::Increment {
                lot_id: lot.id,
                delta,
            })
        }
        None => Ok(LotWrite::Create(input.clone())),
    }
}

/// Lots for `name` in consumption order: oldest `inserted_at` first, ties by lot ID.
fn consumption_order<'a>(lots: &'a [StockLot], name: &str) -> Vec<&'a StockLot> {
    let mut matching: Vec<&StockLot> = lots.iter().filter(|lot| lot.name == name).collect();
    matching.sort_by_key(|lot| (lot.inserted_at, lot.id));
    matching
}

/// Plan the deductions needed to consume `requested` units of `name`.
///
/// Walks the lots oldest first, taking `min(remaining, lot.quantity)` from
/// each until the request is covered or the lots run out. Exhausted lots are
/// skipped and never appear in the deduction list.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidArgument`] if `requested` is not positive.
pub fn plan_consumption(
    lots: &[StockLot],
    name: &str,
    requested: Decimal,
) -> Result<ConsumptionResult, LedgerError> {
    let requested = require_positive("requested quantity", requested)?;
    let mut outstanding = requested;
    let mut deductions = Vec::new();

    for lot in consumption_order(lots, name) {
        if outstanding.is_zero() {
            break;
        }
        if !lot.is_available() {
            continue;
        }
        let amount = outstanding.min(lot.quantity);
        outstanding -= amount;
        deductions.push(Deduction {
            lot_id: lot.id,
            amount,
            remaining: lot.quantity - amount,
        });
    }

    Ok(ConsumptionResult {
        name: name.to_string(),
        requested,
        deductions,
        unfulfilled: outstanding,
    })
}

/// Lots for `name` that still hold stock, in consumption order.
#[must_use]
pub fn available_lots(lots: &[StockLot], name: &str) -> Vec<StockLot> {
    consumption_order(lots, name)
        .into_iter()
        .filter(|lot| lot.is_available())
        .cloned()
        .collect()
}

/// Aggregate lots by name: total quantity and the nearest expiry.
///
/// # Errors
///
/// Returns [`LedgerError::QuantityOverflow`] if the lots of one name sum past
/// the representable range.
pub fn summarize(lots: &[StockLot]) -> Result<BTreeMap<String, StockSummary>, LedgerError> {
    let mut summaries: BTreeMap<String, StockSummary> = BTreeMap::new();

    for lot in lots {
        match summaries.get_mut(&lot.name) {
            Some(summary) => {
                summary.total_quantity = summary
                    .total_quantity
                    .checked_add(lot.quantity)
                    .ok_or_else(|| LedgerError::QuantityOverflow(lot.name.clone()))?;
                summary.nearest_expiry = summary.nearest_expiry.min(lot.expires_at);
                summary.lot_count += 1;
            }
            None => {
                summaries.insert(
                    lot.name.clone(),
                    StockSummary {
                        total_quantity: lot.quantity,
                        nearest_expiry: lot.expires_at,
                        lot_count: 1,
                    },
                );
            }
        }
    }

    Ok(summaries)
}
