//! Error types for the ledger, settlement and storage layers.

use thiserror::Error;

use crate::types::{LotId, OrderId, QuantityError};

/// Errors raised by a storage collaborator.
///
/// The core never retries these; retry policy belongs to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not be reached or refused the request.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// An increment targeted a lot the store does not hold.
    #[error("lot {0} does not exist")]
    MissingLot(LotId),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    Corrupt(String),

    /// A write would push a value past what the store can represent.
    #[error("overflow: {0}")]
    Overflow(String),
}

/// Errors from inventory ledger operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A caller-supplied argument was rejected before any mutation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Stored quantities for a name add up past the representable range.
    #[error("quantity total for {0} overflows")]
    QuantityOverflow(String),

    /// The storage collaborator failed.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl From<QuantityError> for LedgerError {
    fn from(err: QuantityError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

/// Errors from pending-payment settlement operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettlementError {
    /// A caller-supplied argument was rejected before any mutation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The order exists in neither the sales nor the scheduled orders collection.
    #[error("order {0} not found in any collection")]
    NotFound(OrderId),

    /// Order or balance amounts add up past the representable range.
    #[error("amount overflow: {0}")]
    Overflow(String),

    /// The storage collaborator failed.
    #[error(transparent)]
    Storage(#[from] StoreError),
}
