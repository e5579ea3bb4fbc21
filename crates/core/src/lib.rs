//! Trailer Ops Core - inventory and pending-payment logic.
//!
//! This crate holds the business rules behind the food trailer's back office:
//! - `inventory` - dated stock lots, merged by name and expiry and consumed
//!   oldest first
//! - `settlement` - unpaid sales and scheduled orders grouped per customer,
//!   and marking them paid
//!
//! # Architecture
//!
//! The core never talks to the document database directly. Storage is an
//! external collaborator described by the traits in [`store`]; the services
//! read a snapshot through them, plan with pure functions, and hand the
//! resulting writes back. [`store::MemoryStore`] is the reference
//! implementation.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, phone keys and quantity validation
//! - [`inventory`] - Lot planning and the [`InventoryLedger`] service
//! - [`settlement`] - Pending-order projection and the [`PendingSettlement`] service
//! - [`store`] - Storage collaborator traits and the in-memory store
//! - [`error`] - Error types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod error;
pub mod inventory;
pub mod settlement;
pub mod store;
pub mod types;

pub use error::{LedgerError, SettlementError, StoreError};
pub use inventory::InventoryLedger;
pub use settlement::PendingSettlement;
pub use types::*;
