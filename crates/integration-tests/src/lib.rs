//! Integration tests for Trailer Ops.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p trailer-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `inventory_ledger` - Lot merging, oldest-first consumption, conservation
//! - `pending_settlement` - Phone resolution, grouping, single and bulk settlement
//!
//! This library only holds fixture builders shared by the test files.

#![cfg_attr(not(test), forbid(unsafe_code))]

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use trailer_core::inventory::LotRecord;
use trailer_core::settlement::{Customer, OrderItem, PaymentMethod, SaleRecord, ScheduledOrder};
use trailer_core::{CustomerId, ItemId, OrderId};

/// Parse a `YYYY-MM-DD` date, falling back to the epoch on malformed input.
#[must_use]
pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap_or_default()
}

/// A fixed timestamp so fixtures compare equal across runs.
#[must_use]
pub fn noon(s: &str) -> DateTime<Utc> {
    date(s).and_hms_opt(12, 0, 0).unwrap_or_default().and_utc()
}

/// Stock to add for `name`.
#[must_use]
pub fn lot(name: &str, quantity: Decimal, inserted: &str, expires: &str) -> LotRecord {
    LotRecord {
        name: name.to_string(),
        quantity,
        inserted_at: date(inserted),
        expires_at: date(expires),
    }
}

/// A customer.
#[must_use]
pub fn customer(id: &str, name: &str, phone: &str) -> Customer {
    Customer {
        id: CustomerId::new(id),
        name: name.to_string(),
        phone: phone.to_string(),
    }
}

/// A single-item order line.
#[must_use]
pub fn line(name: &str, unit_price: Decimal, qty: Decimal) -> OrderItem {
    OrderItem {
        id: ItemId::new(name.to_lowercase()),
        name: name.to_string(),
        unit_price,
        qty,
    }
}

/// An unpaid sale on a customer's tab.
#[must_use]
pub fn sale(id: &str, customer_id: &str, items: Vec<OrderItem>) -> SaleRecord {
    SaleRecord {
        id: OrderId::new(id),
        customer_id: Some(CustomerId::new(customer_id)),
        items,
        total: None,
        paid: false,
        created_at: noon("2024-06-01"),
        payment_method: PaymentMethod::OnAccount,
    }
}

/// An unpaid scheduled order identified only by phone.
#[must_use]
pub fn scheduled(id: &str, phone: &str, items: Vec<OrderItem>) -> ScheduledOrder {
    ScheduledOrder {
        id: OrderId::new(id),
        customer_id: None,
        phone: phone.to_string(),
        customer_name: None,
        scheduled_for: Some(date("2024-06-08")),
        items,
        total: None,
        paid: false,
        created_at: noon("2024-06-02"),
        payment_method: PaymentMethod::OnAccount,
    }
}
