//! Core value types.
//!
//! This module provides type-safe wrappers for IDs, phone keys and quantities.

pub mod id;
pub mod phone;
pub mod quantity;

pub use id::*;
pub use phone::PhoneKey;
pub use quantity::{QuantityError, require_positive};
