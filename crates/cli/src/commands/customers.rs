//! Customer commands.

use std::path::Path;

use tracing::{info, instrument};

use trailer_core::settlement::build_customer_phone_index;
use trailer_core::store::OrderStore;

use super::{CommandError, open_store};
use crate::config::Session;

/// Print every customer with the phone key used for matching orders.
///
/// # Errors
///
/// Returns an error if the data file cannot be loaded.
#[instrument(skip(session, path), fields(operator = %session.operator))]
pub async fn list(session: &Session, path: &Path) -> Result<(), CommandError> {
    let store = open_store(path).await?;
    let customers = store.list_customers().await?;
    let index = build_customer_phone_index(&customers);

    info!("Customers ({})", customers.len());
    info!("=============");
    for customer in &customers {
        let key = customer.phone_key();
        let matched = index.get(&key) == Some(&customer.id);
        if key.is_empty() || matched {
            info!("{} - {} [{}]", customer.id, customer.name, key);
        } else {
            info!(
                "{} - {} [{}] (phone shared; orders match another customer)",
                customer.id, customer.name, key
            );
        }
    }
    Ok(())
}
