//! Order/catalog store boundary.
//!
//! The conversation core never talks to storage directly. A message handler
//! reads the customer, the catalog and the current order through this trait and
//! writes back at most one replacement order.

use std::sync::Arc;

use thiserror::Error;

use chatorder_catalog::CatalogEntry;
use chatorder_core::CustomerPhone;
use chatorder_customers::Customer;
use chatorder_orders::{Order, OrderLine, OrderStatus};

/// Store operation error.
///
/// These are collaborator failures (network, remote API, payload shape), not
/// domain errors. None of them is recovered: the request that hit one fails.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("network error: {0}")]
    Network(String),

    #[error("data API error ({0}): {1}")]
    Api(u16, String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Abstract persistence for customers, the catalog and per-phone orders.
///
/// Calls are made sequentially within one request; implementations need no
/// cross-call transactions.
#[async_trait::async_trait]
pub trait OrderStore: Send + Sync {
    /// The customer registered under `phone`, if any.
    async fn fetch_customer(&self, phone: &CustomerPhone) -> Result<Option<Customer>, StoreError>;

    /// Current catalog snapshot.
    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, StoreError>;

    /// The stored order for `phone`, if any.
    async fn fetch_order(&self, phone: &CustomerPhone) -> Result<Option<Order>, StoreError>;

    /// Replace the whole order for `phone`.
    async fn replace_order(
        &self,
        phone: &CustomerPhone,
        customer_name: &str,
        lines: &[OrderLine],
        status: OrderStatus,
    ) -> Result<(), StoreError>;
}

#[async_trait::async_trait]
impl<S> OrderStore for Arc<S>
where
    S: OrderStore + ?Sized,
{
    async fn fetch_customer(&self, phone: &CustomerPhone) -> Result<Option<Customer>, StoreError> {
        (**self).fetch_customer(phone).await
    }

    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, StoreError> {
        (**self).fetch_catalog().await
    }

    async fn fetch_order(&self, phone: &CustomerPhone) -> Result<Option<Order>, StoreError> {
        (**self).fetch_order(phone).await
    }

    async fn replace_order(
        &self,
        phone: &CustomerPhone,
        customer_name: &str,
        lines: &[OrderLine],
        status: OrderStatus,
    ) -> Result<(), StoreError> {
        (**self).replace_order(phone, customer_name, lines, status).await
    }
}
