use std::collections::HashMap;
use std::sync::RwLock;

use chatorder_catalog::CatalogEntry;
use chatorder_core::CustomerPhone;
use chatorder_customers::Customer;
use chatorder_orders::{Order, OrderLine, OrderStatus};

use crate::store::{OrderStore, StoreError};

/// Order as last written, including the customer name sent with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredOrder {
    pub customer_name: String,
    pub lines: Vec<OrderLine>,
    pub status: OrderStatus,
}

/// In-memory store.
///
/// Intended for tests/dev. Customers and the catalog are seeded up front;
/// orders live only as long as the process.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    customers: RwLock<HashMap<CustomerPhone, Customer>>,
    catalog: RwLock<Vec<CatalogEntry>>,
    orders: RwLock<HashMap<CustomerPhone, StoredOrder>>,
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(catalog: Vec<CatalogEntry>) -> Self {
        Self {
            catalog: RwLock::new(catalog),
            ..Self::default()
        }
    }

    pub fn upsert_customer(&self, phone: CustomerPhone, customer: Customer) -> Result<(), StoreError> {
        self.customers.write().map_err(poisoned)?.insert(phone, customer);
        Ok(())
    }

    /// The order as last written for `phone`.
    pub fn stored_order(&self, phone: &CustomerPhone) -> Result<Option<StoredOrder>, StoreError> {
        Ok(self.orders.read().map_err(poisoned)?.get(phone).cloned())
    }
}

#[async_trait::async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn fetch_customer(&self, phone: &CustomerPhone) -> Result<Option<Customer>, StoreError> {
        Ok(self.customers.read().map_err(poisoned)?.get(phone).cloned())
    }

    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, StoreError> {
        Ok(self.catalog.read().map_err(poisoned)?.clone())
    }

    async fn fetch_order(&self, phone: &CustomerPhone) -> Result<Option<Order>, StoreError> {
        let orders = self.orders.read().map_err(poisoned)?;
        orders
            .get(phone)
            .map(|stored| Order::restore(phone.clone(), stored.status, stored.lines.clone()))
            .transpose()
            .map_err(|e| StoreError::Parse(e.to_string()))
    }

    async fn replace_order(
        &self,
        phone: &CustomerPhone,
        customer_name: &str,
        lines: &[OrderLine],
        status: OrderStatus,
    ) -> Result<(), StoreError> {
        self.orders.write().map_err(poisoned)?.insert(
            phone.clone(),
            StoredOrder {
                customer_name: customer_name.to_string(),
                lines: lines.to_vec(),
                status,
            },
        );
        Ok(())
    }
}
