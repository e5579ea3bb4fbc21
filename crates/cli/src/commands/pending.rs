//! Pending payment commands.
//!
//! # Usage
//!
//! ```bash
//! # Who owes what, largest balance first
//! trailer pending list
//!
//! # Settle orders (sales or scheduled orders, by document ID)
//! trailer pending settle abc123 def456
//! ```

use std::path::Path;

use tracing::{error, info, instrument};

use trailer_core::settlement::{BulkSettlement, CustomerBalance};
use trailer_core::{OrderId, PendingSettlement};

use super::{CommandError, open_store, save_store};
use crate::config::Session;

/// Print each customer's unpaid orders and balance.
///
/// # Errors
///
/// Returns an error if the data file cannot be loaded.
#[instrument(skip(session, path), fields(operator = %session.operator))]
pub async fn list(session: &Session, path: &Path) -> Result<Vec<CustomerBalance>, CommandError> {
    let store = open_store(path).await?;
    let settlement = PendingSettlement::new(&store);

    let balances = settlement.balances().await?;
    info!("Pending payments ({} customers)", balances.len());
    info!("=================================");
    for balance in &balances {
        info!("{} ({}): {}", balance.name, balance.phone, balance.total);
        for order in &balance.orders {
            info!(
                "  [{}] {} {} - {}",
                order.kind,
                order.id,
                order.created_at.format("%Y-%m-%d"),
                order.total()?
            );
            if let Err(e) = order.validate_total() {
                error!("  {e}");
            }
        }
    }
    Ok(balances)
}

/// Mark the given orders paid.
///
/// Every ID is attempted; failures are listed and turn into a
/// `CommandError::PartialSettlement` after the successful ones are saved.
///
/// # Errors
///
/// Returns an error if the data file cannot be loaded or saved, or if any
/// order could not be settled.
#[instrument(skip(session, path, ids), fields(operator = %session.operator, count = ids.len()))]
pub async fn settle(
    session: &Session,
    path: &Path,
    ids: &[String],
) -> Result<BulkSettlement, CommandError> {
    let store = open_store(path).await?;
    let settlement = PendingSettlement::new(&store);

    let ids: Vec<OrderId> = ids.iter().map(|id| OrderId::new(id.as_str())).collect();
    let bulk = settlement.mark_paid_bulk(&ids).await;
    save_store(path, &store).await?;

    for outcome in &bulk.outcomes {
        match &outcome.result {
            Ok(kind) => info!("Settled {} ({kind})", outcome.order_id),
            Err(e) => error!("Could not settle {}: {e}", outcome.order_id),
        }
    }

    let failed = bulk.failed().count();
    if failed > 0 {
        return Err(CommandError::PartialSettlement {
            failed,
            total: bulk.outcomes.len(),
        });
    }
    Ok(bulk)
}
