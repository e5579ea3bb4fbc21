//! Pure transformations behind the pending-payments page.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use super::{Customer, OrderRecord, PendingSource, SaleRecord, ScheduledOrder};
use crate::error::SettlementError;
use crate::types::{CustomerId, PhoneKey};

/// Normalize a phone for comparison: digits only, last 11 kept.
#[must_use]
pub fn normalize_phone(raw: &str) -> String {
    PhoneKey::normalize(raw).to_string()
}

/// Lookup from normalized phone to customer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhoneIndex(HashMap<PhoneKey, CustomerId>);

impl PhoneIndex {
    /// Customer owning a raw (un-normalized) phone, if any.
    #[must_use]
    pub fn resolve(&self, raw_phone: &str) -> Option<&CustomerId> {
        let key = PhoneKey::normalize(raw_phone);
        if key.is_empty() {
            return None;
        }
        self.0.get(&key)
    }

    /// Customer owning an already-normalized key.
    #[must_use]
    pub fn get(&self, key: &PhoneKey) -> Option<&CustomerId> {
        self.0.get(key)
    }

    /// Number of indexed phones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no phone is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Index customers by normalized phone.
///
/// When two customers share a normalized phone the later one wins, and the
/// collision is logged. Customers without any digits in their phone are not
/// indexed.
#[must_use]
pub fn build_customer_phone_index(customers: &[Customer]) -> PhoneIndex {
    let mut index = HashMap::with_capacity(customers.len());

    for customer in customers {
        let key = customer.phone_key();
        if key.is_empty() {
            continue;
        }
        if let Some(previous) = index.insert(key.clone(), customer.id.clone()) {
            warn!(
                phone = %key,
                previous = %previous,
                current = %customer.id,
                "Customers share a phone number; later customer wins"
            );
        }
    }

    PhoneIndex(index)
}

/// Unpaid sales and scheduled orders in one list, sales first.
#[must_use]
pub fn unify_pending_orders(
    sales: Vec<SaleRecord>,
    scheduled_orders: Vec<ScheduledOrder>,
    index: &PhoneIndex,
) -> Vec<OrderRecord> {
    sales
        .into_iter()
        .map(PendingSource::Sale)
        .chain(scheduled_orders.into_iter().map(PendingSource::Scheduled))
        .filter(|source| !source.is_paid())
        .map(|source| source.project(index))
        .collect()
}

/// Group orders by customer, dropping unresolved ones.
///
/// Within a group, input order is preserved.
#[must_use]
pub fn group_by_customer(orders: Vec<OrderRecord>) -> BTreeMap<CustomerId, Vec<OrderRecord>> {
    let mut groups: BTreeMap<CustomerId, Vec<OrderRecord>> = BTreeMap::new();
    for order in orders.into_iter().filter(OrderRecord::is_resolved) {
        groups.entry(order.customer_id.clone()).or_default().push(order);
    }
    groups
}

/// What one customer owes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerBalance {
    /// Customer ID.
    pub customer_id: CustomerId,
    /// Customer name, or the ID when the customer record is missing.
    pub name: String,
    /// Customer phone as stored (empty when the record is missing).
    pub phone: String,
    /// Unpaid orders.
    pub orders: Vec<OrderRecord>,
    /// Sum of order totals.
    pub total: Decimal,
}

/// Turn customer groups into balances, largest debt first.
///
/// # Errors
///
/// Returns [`SettlementError::Overflow`] if an order total or a customer's
/// balance overflows.
pub fn pending_balances(
    groups: BTreeMap<CustomerId, Vec<OrderRecord>>,
    customers: &[Customer],
) -> Result<Vec<CustomerBalance>, SettlementError> {
    let by_id: HashMap<&CustomerId, &Customer> = customers.iter().map(|c| (&c.id, c)).collect();

    let mut balances = Vec::with_capacity(groups.len());
    for (customer_id, orders) in groups {
        let (name, phone) = by_id.get(&customer_id).map_or_else(
            || (customer_id.to_string(), String::new()),
            |c| (c.name.clone(), c.phone.clone()),
        );
        let mut total = Decimal::ZERO;
        for order in &orders {
            total = total.checked_add(order.total()?).ok_or_else(|| {
                SettlementError::Overflow(format!("balance of customer {customer_id}"))
            })?;
        }
        balances.push(CustomerBalance {
            customer_id,
            name,
            phone,
            orders,
            total,
        });
    }

    balances.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.customer_id.cmp(&b.customer_id))
    });
    Ok(balances)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::Utc;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::settlement::{OrderItem, OrderKind, PaymentMethod};
    use crate::types::{ItemId, OrderId};

    fn customer(id: &str, name: &str, phone: &str) -> Customer {
        Customer {
            id: CustomerId::new(id),
            name: name.to_string(),
            phone: phone.to_string(),
        }
    }

    fn items(price: Decimal) -> Vec<OrderItem> {
        vec![OrderItem {
            id: ItemId::new("burger"),
            name: "Burger".to_string(),
            unit_price: price,
            qty: dec!(1),
        }]
    }

    fn sale(id: &str, customer_id: Option<&str>, paid: bool, price: Decimal) -> SaleRecord {
        SaleRecord {
            id: OrderId::new(id),
            customer_id: customer_id.map(CustomerId::new),
            items: items(price),
            total: None,
            paid,
            created_at: Utc::now(),
            payment_method: PaymentMethod::OnAccount,
        }
    }

    fn scheduled(id: &str, phone: &str, paid: bool, price: Decimal) -> ScheduledOrder {
        ScheduledOrder {
            id: OrderId::new(id),
            customer_id: None,
            phone: phone.to_string(),
            customer_name: None,
            scheduled_for: None,
            items: items(price),
            total: None,
            paid,
            created_at: Utc::now(),
            payment_method: PaymentMethod::OnAccount,
        }
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("(11) 98888-7777"), "11988887777");
        assert_eq!(normalize_phone("+55 11 98888-7777"), "11988887777");
    }

    #[test]
    fn test_index_resolves_formatted_phone() {
        let index = build_customer_phone_index(&[customer("c1", "Ana", "(11) 98888-7777")]);
        assert_eq!(index.resolve("11988887777"), Some(&CustomerId::new("c1")));
        assert_eq!(index.resolve("11 98888 7777"), Some(&CustomerId::new("c1")));
        assert_eq!(index.resolve("11900000000"), None);
    }

    #[test]
    fn test_index_last_write_wins() {
        let index = build_customer_phone_index(&[
            customer("c1", "Ana", "11988887777"),
            customer("c2", "Bia", "(11) 98888-7777"),
        ]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.resolve("11988887777"), Some(&CustomerId::new("c2")));
    }

    #[test]
    fn test_index_skips_empty_phones() {
        let index = build_customer_phone_index(&[customer("c1", "Ana", ""), customer("c2", "Bia", "-")]);
        assert!(index.is_empty());
        assert_eq!(index.resolve(""), None);
    }

    #[test]
    fn test_unify_filters_paid_and_keeps_order() {
        let index = build_customer_phone_index(&[customer("c1", "Ana", "11988887777")]);
        let orders = unify_pending_orders(
            vec![
                sale("s1", Some("c2"), false, dec!(10)),
                sale("s2", Some("c2"), true, dec!(10)),
            ],
            vec![
                scheduled("o1", "(11) 98888-7777", false, dec!(20)),
                scheduled("o2", "11988887777", true, dec!(20)),
                scheduled("o3", "99999", false, dec!(5)),
            ],
            &index,
        );

        let ids: Vec<&str> = orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "o1", "o3"]);
        assert_eq!(orders[0].kind, OrderKind::Sale);
        assert_eq!(orders[1].customer_id, CustomerId::new("c1"));
        assert!(!orders[2].is_resolved());
    }

    #[test]
    fn test_group_drops_unresolved() {
        let index = build_customer_phone_index(&[customer("c1", "Ana", "11988887777")]);
        let orders = unify_pending_orders(
            vec![sale("s1", Some("c1"), false, dec!(10)), sale("s2", None, false, dec!(3))],
            vec![
                scheduled("o1", "11988887777", false, dec!(20)),
                scheduled("o2", "", false, dec!(7)),
            ],
            &index,
        );
        let groups = group_by_customer(orders);

        assert_eq!(groups.len(), 1);
        let ids: Vec<&str> = groups[&CustomerId::new("c1")]
            .iter()
            .map(|o| o.id.as_str())
            .collect();
        assert_eq!(ids, vec!["s1", "o1"]);
    }

    #[test]
    fn test_balances_sorted_by_total() {
        let customers = [customer("c1", "Ana", "1"), customer("c2", "Bia", "2")];
        let index = build_customer_phone_index(&customers);
        let orders = unify_pending_orders(
            vec![
                sale("s1", Some("c1"), false, dec!(10)),
                sale("s2", Some("c2"), false, dec!(15)),
                sale("s3", Some("c1"), false, dec!(2.5)),
                sale("s4", Some("ghost"), false, dec!(1)),
            ],
            vec![],
            &index,
        );
        let balances = pending_balances(group_by_customer(orders), &customers).unwrap();

        assert_eq!(balances.len(), 3);
        assert_eq!(balances[0].name, "Bia");
        assert_eq!(balances[0].total, dec!(15));
        assert_eq!(balances[1].name, "Ana");
        assert_eq!(balances[1].total, dec!(12.5));
        assert_eq!(balances[1].orders.len(), 2);
        assert_eq!(balances[2].name, "ghost");
        assert!(balances[2].phone.is_empty());
    }

    #[test]
    fn test_balance_overflow_is_reported() {
        let customers = [customer("c1", "Ana", "1")];
        let orders = unify_pending_orders(
            vec![
                sale("s1", Some("c1"), false, Decimal::MAX),
                sale("s2", Some("c1"), false, Decimal::MAX),
            ],
            vec![],
            &PhoneIndex::default(),
        );
        assert!(matches!(
            pending_balances(group_by_customer(orders), &customers),
            Err(SettlementError::Overflow(msg)) if msg.contains("c1")
        ));
    }
}
