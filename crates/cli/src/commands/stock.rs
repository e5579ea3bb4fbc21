//! Stock commands.
//!
//! # Usage
//!
//! ```bash
//! # Receive 24 buns expiring on the 12th
//! trailer stock add -n buns -q 24 --expires 2024-06-12
//!
//! # Use 10 buns, oldest lot first
//! trailer stock consume -n buns -q 10
//!
//! # Totals and nearest expiry per item, warning 3 days ahead
//! trailer stock summary --warn-days 3
//!
//! # Lots of one item that still hold stock
//! trailer stock available -n buns
//! ```

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use trailer_core::InventoryLedger;
use trailer_core::inventory::{ConsumptionResult, LotChange, LotRecord};

use super::{CommandError, open_store, save_store};
use crate::config::Session;

/// Add a lot, merging into the lot with the same name and expiry.
///
/// `inserted` defaults to today.
///
/// # Errors
///
/// Returns an error if the data file cannot be loaded or saved, or the
/// quantity is not positive.
#[instrument(skip(session, path), fields(operator = %session.operator))]
pub async fn add(
    session: &Session,
    path: &Path,
    name: &str,
    quantity: Decimal,
    inserted: Option<NaiveDate>,
    expires: NaiveDate,
) -> Result<LotChange, CommandError> {
    let store = open_store(path).await?;
    let ledger = InventoryLedger::new(&store);

    let change = ledger
        .add_or_merge_lot(LotRecord {
            name: name.to_string(),
            quantity,
            inserted_at: inserted.unwrap_or_else(|| Utc::now().date_naive()),
            expires_at: expires,
        })
        .await?;
    save_store(path, &store).await?;

    match change {
        LotChange::Created(id) => info!("Created lot {id} with {quantity} x {name}"),
        LotChange::Merged(id) => info!("Added {quantity} x {name} to lot {id}"),
    }
    Ok(change)
}

/// Consume stock oldest lot first.
///
/// A shortfall is printed as a warning; the stock that was available is
/// still consumed.
///
/// # Errors
///
/// Returns an error if the data file cannot be loaded or saved, or the
/// quantity is not positive.
#[instrument(skip(session, path), fields(operator = %session.operator))]
pub async fn consume(
    session: &Session,
    path: &Path,
    name: &str,
    quantity: Decimal,
) -> Result<ConsumptionResult, CommandError> {
    let store = open_store(path).await?;
    let ledger = InventoryLedger::new(&store);

    let result = ledger.consume(name, quantity).await?;
    save_store(path, &store).await?;

    for deduction in &result.deductions {
        info!(
            "  lot {}: -{} (left {})",
            deduction.lot_id, deduction.amount, deduction.remaining
        );
    }
    if result.is_fulfilled() {
        info!("Consumed {quantity} x {name}");
    } else {
        warn!(
            "Only {} of {quantity} x {name} available; {} not covered",
            result.deducted_total(),
            result.unfulfilled
        );
    }
    Ok(result)
}

/// Print totals and nearest expiry per item.
///
/// # Errors
///
/// Returns an error if the data file cannot be loaded.
#[instrument(skip(session, path), fields(operator = %session.operator))]
pub async fn summary(session: &Session, path: &Path, warn_days: i64) -> Result<(), CommandError> {
    let store = open_store(path).await?;
    let ledger = InventoryLedger::new(&store);
    let today = Utc::now().date_naive();

    let summaries = ledger.summarize().await?;
    info!("Stock summary ({} items)", summaries.len());
    info!("========================");
    for (name, summary) in &summaries {
        let line = format!(
            "{name}: {} in {} lot(s), nearest expiry {}",
            summary.total_quantity, summary.lot_count, summary.nearest_expiry
        );
        if summary.expires_within(today, warn_days) {
            warn!("{line} (expiring soon)");
        } else {
            info!("{line}");
        }
    }
    Ok(())
}

/// Print lots of `name` that still hold stock, in consumption order.
///
/// # Errors
///
/// Returns an error if the data file cannot be loaded.
#[instrument(skip(session, path), fields(operator = %session.operator))]
pub async fn available(session: &Session, path: &Path, name: &str) -> Result<(), CommandError> {
    let store = open_store(path).await?;
    let ledger = InventoryLedger::new(&store);

    let lots = ledger.available(name).await?;
    if lots.is_empty() {
        warn!("No {name} in stock");
    }
    for lot in lots {
        info!(
            "lot {}: {} (received {}, expires {})",
            lot.id, lot.quantity, lot.inserted_at, lot.expires_at
        );
    }
    Ok(())
}
