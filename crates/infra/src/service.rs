//! Message handling pipeline.
//!
//! ```text
//! fetch customer → fetch catalog → fetch order → engine → replace order (0 or 1)
//! ```
//!
//! Calls are awaited one after another. The single write happens last, so a
//! failed fetch never leaves a half-written order behind.

use chrono::{DateTime, FixedOffset, Utc};
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use chatorder_conversation::{ConversationEngine, Outcome};
use chatorder_core::CustomerPhone;

use crate::store::{OrderStore, StoreError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("store failure: {0}")]
    Store(#[from] StoreError),
}

/// Runs one message through the store and the conversation engine.
#[derive(Debug, Clone)]
pub struct ConversationService<S> {
    store: S,
    engine: ConversationEngine,
    tz: FixedOffset,
}

impl<S> ConversationService<S>
where
    S: OrderStore,
{
    pub fn new(store: S, engine: ConversationEngine, tz: FixedOffset) -> Self {
        Self { store, engine, tz }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Handle a message received now; returns the reply text.
    pub async fn handle(&self, phone: &CustomerPhone, text: &str) -> Result<String, ServiceError> {
        let now = Utc::now().with_timezone(&self.tz);
        self.handle_at(phone, text, now).await.map(|outcome| outcome.reply)
    }

    /// Handle a message as if received at `now`.
    pub async fn handle_at(
        &self,
        phone: &CustomerPhone,
        text: &str,
        now: DateTime<FixedOffset>,
    ) -> Result<Outcome, ServiceError> {
        let span = tracing::info_span!(
            "message",
            phone = %phone,
            request_id = %Uuid::now_v7(),
        );
        self.run(phone, text, now).instrument(span).await
    }

    async fn run(
        &self,
        phone: &CustomerPhone,
        text: &str,
        now: DateTime<FixedOffset>,
    ) -> Result<Outcome, ServiceError> {
        let customer = self.store.fetch_customer(phone).await.map_err(log_store_error)?;
        let catalog = self.store.fetch_catalog().await.map_err(log_store_error)?;
        let order = self.store.fetch_order(phone).await.map_err(log_store_error)?;

        tracing::debug!(
            known_customer = customer.is_some(),
            catalog_size = catalog.len(),
            has_order = order.is_some(),
            "loaded conversation state"
        );

        let outcome = self
            .engine
            .handle_message(phone, text, customer.as_ref(), &catalog, order, &now);
        tracing::info!(intent = %outcome.intent, "message handled");

        if let Some(write) = &outcome.write {
            self.store
                .replace_order(&write.phone, &write.customer_name, &write.lines, write.status)
                .await
                .map_err(log_store_error)?;
            tracing::info!(
                status = ?write.status,
                lines = write.lines.len(),
                "order written"
            );
        }

        Ok(outcome)
    }
}

fn log_store_error(err: StoreError) -> ServiceError {
    tracing::error!(error = %err, "store call failed");
    ServiceError::Store(err)
}
