//! Pending payments: unpaid sales and scheduled orders grouped by customer.
//!
//! Two record shapes feed this module. Direct sales always carry a customer
//! reference; scheduled orders often only carry the phone number typed in when
//! the order was booked. [`PendingSource`] wraps both and projects them into a
//! single [`OrderRecord`].

pub mod pending;
pub mod service;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::SettlementError;
use crate::types::{CustomerId, ItemId, OrderId, PhoneKey};

pub use pending::{
    CustomerBalance, PhoneIndex, build_customer_phone_index, group_by_customer, normalize_phone,
    pending_balances, unify_pending_orders,
};
pub use service::{BulkSettlement, PendingSettlement, SettlementOutcome};

/// Which collection an order lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    /// Over-the-counter sale from the checkout page.
    Sale,
    /// Order booked ahead for a date.
    Scheduled,
}

/// Collections tried, in order, when settling an order by ID alone.
pub const SETTLEMENT_CHAIN: [OrderKind; 2] = [OrderKind::Sale, OrderKind::Scheduled];

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sale => write!(f, "sale"),
            Self::Scheduled => write!(f, "scheduled"),
        }
    }
}

impl FromStr for OrderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sale" => Ok(Self::Sale),
            "scheduled" => Ok(Self::Scheduled),
            _ => Err(format!("invalid order kind: {s}")),
        }
    }
}

/// How the customer paid (or will pay).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Paid in cash at the window.
    Cash,
    /// Debit or credit card.
    Card,
    /// Instant bank transfer.
    Pix,
    /// Put on the customer's tab, to be settled later.
    #[default]
    OnAccount,
    /// Any method this build does not know about.
    #[serde(other)]
    Other,
}

/// A line on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product ID.
    pub id: ItemId,
    /// Product name at the time of sale.
    pub name: String,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Units sold.
    pub qty: Decimal,
}

impl OrderItem {
    /// `unit_price * qty`, or `None` if the product overflows.
    #[must_use]
    pub fn line_total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(self.qty)
    }
}

/// A customer of the trailer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Document ID.
    pub id: CustomerId,
    /// Display name.
    pub name: String,
    /// Phone as typed in, any format.
    #[serde(default)]
    pub phone: String,
}

impl Customer {
    /// Comparison key for this customer's phone.
    #[must_use]
    pub fn phone_key(&self) -> PhoneKey {
        PhoneKey::normalize(&self.phone)
    }
}

/// A direct sale recorded at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRecord {
    /// Document ID.
    pub id: OrderId,
    /// Customer the sale was rung up for, if any.
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    /// Items in cart order.
    pub items: Vec<OrderItem>,
    /// Total stored alongside the items.
    #[serde(default)]
    pub total: Option<Decimal>,
    /// Whether the sale has been paid.
    pub paid: bool,
    /// When the sale was recorded.
    pub created_at: DateTime<Utc>,
    /// Payment method chosen at checkout.
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

/// An order booked ahead for pickup or delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledOrder {
    /// Document ID.
    pub id: OrderId,
    /// Explicit customer reference, when the order was booked for a known customer.
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    /// Phone typed in when booking.
    #[serde(default)]
    pub phone: String,
    /// Name typed in when booking.
    #[serde(default)]
    pub customer_name: Option<String>,
    /// Date the order is due.
    #[serde(default)]
    pub scheduled_for: Option<NaiveDate>,
    /// Items in cart order.
    pub items: Vec<OrderItem>,
    /// Total stored alongside the items.
    #[serde(default)]
    pub total: Option<Decimal>,
    /// Whether the order has been paid.
    pub paid: bool,
    /// When the order was booked.
    pub created_at: DateTime<Utc>,
    /// Payment method agreed on.
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

/// Either source record, before projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingSource {
    /// A direct sale.
    Sale(SaleRecord),
    /// A scheduled order.
    Scheduled(ScheduledOrder),
}

impl PendingSource {
    /// Whether the underlying record is already paid.
    #[must_use]
    pub const fn is_paid(&self) -> bool {
        match self {
            Self::Sale(sale) => sale.paid,
            Self::Scheduled(order) => order.paid,
        }
    }

    /// Project into the common [`OrderRecord`] shape.
    ///
    /// Sales keep their customer reference as-is. Scheduled orders use their
    /// explicit reference, else the phone index, else stay unresolved
    /// (empty customer ID).
    #[must_use]
    pub fn project(self, index: &PhoneIndex) -> OrderRecord {
        match self {
            Self::Sale(sale) => OrderRecord {
                id: sale.id,
                kind: OrderKind::Sale,
                customer_id: sale.customer_id.unwrap_or_default(),
                phone: String::new(),
                items: sale.items,
                stored_total: sale.total,
                paid: sale.paid,
                created_at: sale.created_at,
                payment_method: sale.payment_method,
            },
            Self::Scheduled(order) => {
                let customer_id = order
                    .customer_id
                    .filter(|id| !id.is_empty())
                    .or_else(|| index.resolve(&order.phone).cloned())
                    .unwrap_or_default();
                OrderRecord {
                    id: order.id,
                    kind: OrderKind::Scheduled,
                    customer_id,
                    phone: order.phone,
                    items: order.items,
                    stored_total: order.total,
                    paid: order.paid,
                    created_at: order.created_at,
                    payment_method: order.payment_method,
                }
            }
        }
    }
}

/// A sale or scheduled order in the shape the pending-payments view uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Document ID.
    pub id: OrderId,
    /// Collection the order came from.
    pub kind: OrderKind,
    /// Resolved customer; empty when unresolved.
    pub customer_id: CustomerId,
    /// Phone from the source record (empty for sales).
    pub phone: String,
    /// Items in cart order.
    pub items: Vec<OrderItem>,
    /// Total stored on the source record, if any.
    pub stored_total: Option<Decimal>,
    /// Payment flag.
    pub paid: bool,
    /// When the order was created.
    pub created_at: DateTime<Utc>,
    /// Payment method.
    pub payment_method: PaymentMethod,
}

impl OrderRecord {
    /// Sum of `unit_price * qty` over the items.
    ///
    /// # Errors
    ///
    /// Returns [`SettlementError::Overflow`] if a line or the sum overflows.
    pub fn computed_total(&self) -> Result<Decimal, SettlementError> {
        self.items
            .iter()
            .try_fold(Decimal::ZERO, |sum, item| {
                item.line_total().and_then(|line| sum.checked_add(line))
            })
            .ok_or_else(|| SettlementError::Overflow(format!("total of order {}", self.id)))
    }

    /// The amount owed: the stored total when present, else the computed one.
    ///
    /// # Errors
    ///
    /// Returns [`SettlementError::Overflow`] if the computed total overflows.
    pub fn total(&self) -> Result<Decimal, SettlementError> {
        self.stored_total.map_or_else(|| self.computed_total(), Ok)
    }

    /// Whether a customer could be resolved for this order.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        !self.customer_id.is_empty()
    }

    /// Check that a stored total agrees with the items.
    ///
    /// # Errors
    ///
    /// Returns [`SettlementError::InvalidArgument`] when the two totals differ
    /// and [`SettlementError::Overflow`] when the items cannot be summed.
    pub fn validate_total(&self) -> Result<(), SettlementError> {
        let Some(stored) = self.stored_total else {
            return Ok(());
        };
        let computed = self.computed_total()?;
        if stored != computed {
            return Err(SettlementError::InvalidArgument(format!(
                "order {} stores total {stored} but items sum to {computed}",
                self.id
            )));
        }
        Ok(())
    }
}
