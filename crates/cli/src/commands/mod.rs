//! Command implementations.
//!
//! Every command loads the JSON snapshot into a [`MemoryStore`], runs against
//! it through the core services, and writes the snapshot back if it changed.

pub mod customers;
pub mod pending;
pub mod stock;

use std::io::ErrorKind;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use trailer_core::store::{MemoryStore, Snapshot};
use trailer_core::{LedgerError, SettlementError, StoreError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The data file could not be read or written.
    #[error("Data file error: {0}")]
    Io(#[from] std::io::Error),

    /// The data file is not a valid snapshot.
    #[error("Data file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The snapshot was readable but inconsistent.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// An inventory operation failed.
    #[error("Inventory error: {0}")]
    Ledger(#[from] LedgerError),

    /// A settlement operation failed.
    #[error("Settlement error: {0}")]
    Settlement(#[from] SettlementError),

    /// Some orders in a bulk settlement failed.
    #[error("{failed} of {total} orders could not be settled")]
    PartialSettlement {
        /// Number of failed orders.
        failed: usize,
        /// Number of orders requested.
        total: usize,
    },
}

/// Load the snapshot at `path` into a store. A missing file is an empty store.
///
/// # Errors
///
/// Returns `CommandError::Io` if the file exists but cannot be read,
/// `CommandError::Json` if it does not parse, and `CommandError::Store` if it
/// is inconsistent.
pub async fn open_store(path: &Path) -> Result<MemoryStore, CommandError> {
    let snapshot = match tokio::fs::read_to_string(path).await {
        Ok(content) => serde_json::from_str::<Snapshot>(&content)?,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "Data file missing, starting empty");
            Snapshot::default()
        }
        Err(e) => return Err(e.into()),
    };

    info!(
        path = %path.display(),
        lots = snapshot.lots.len(),
        sales = snapshot.sales.len(),
        scheduled_orders = snapshot.scheduled_orders.len(),
        customers = snapshot.customers.len(),
        "Loaded data file"
    );

    Ok(MemoryStore::from_snapshot(snapshot)?)
}

/// Write the store back to `path`.
///
/// Writes to a sibling temporary file first and renames it over the target,
/// so a crash never leaves a half-written snapshot.
///
/// # Errors
///
/// Returns `CommandError::Io` if writing fails.
pub async fn save_store(path: &Path, store: &MemoryStore) -> Result<(), CommandError> {
    let snapshot = store.snapshot()?;
    let content = serde_json::to_string_pretty(&snapshot)?;

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, content).await?;
    tokio::fs::rename(&tmp, path).await?;

    debug!(path = %path.display(), "Saved data file");
    Ok(())
}
