//! Service wiring: which store a request talks to, plus shared engine/config.

use std::sync::Arc;

use chrono::FixedOffset;

use chatorder_conversation::ConversationEngine;
use chatorder_core::CustomerPhone;
use chatorder_infra::{
    AppConfig, ConversationService, DataApiClient, InMemoryOrderStore, ServiceError, StoreError,
};

/// Process-wide state shared by all handlers.
#[derive(Debug)]
pub struct AppServices {
    api_secret: String,
    default_data_api: Option<String>,
    http: reqwest::Client,
    engine: ConversationEngine,
    tz: FixedOffset,
    /// Fallback store when no data API is configured or named by the request.
    memory: Arc<InMemoryOrderStore>,
}

impl AppServices {
    pub fn from_config(config: &AppConfig, memory: Arc<InMemoryOrderStore>) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(config.data_api_timeout)
            .build()
            .map_err(|e| StoreError::Network(e.to_string()))?;

        Ok(Self {
            api_secret: config.api_secret.clone(),
            default_data_api: config.data_api_url.clone(),
            http,
            engine: ConversationEngine::new(config.window),
            tz: config.tz_offset,
            memory,
        })
    }

    pub fn accepts_key(&self, key: Option<&str>) -> bool {
        key.is_some_and(|k| !k.is_empty() && k == self.api_secret)
    }

    /// Run one message against the data API the request names, the configured
    /// one, or the in-memory store, in that order.
    pub async fn handle_message(
        &self,
        data_api: Option<&str>,
        phone: &CustomerPhone,
        text: &str,
    ) -> Result<String, ServiceError> {
        let url = data_api
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .or(self.default_data_api.as_deref());

        match url {
            Some(url) => {
                let client = DataApiClient::with_client(self.http.clone(), url, self.api_secret.as_str());
                ConversationService::new(client, self.engine.clone(), self.tz)
                    .handle(phone, text)
                    .await
            }
            None => {
                ConversationService::new(self.memory.clone(), self.engine.clone(), self.tz)
                    .handle(phone, text)
                    .await
            }
        }
    }
}
