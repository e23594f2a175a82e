//! Infrastructure layer: store adapters, configuration, message pipeline.

pub mod config;
pub mod data_api;
pub mod in_memory;
pub mod service;
pub mod store;

pub use config::{AppConfig, ConfigError, DEV_API_SECRET};
pub use data_api::DataApiClient;
pub use in_memory::{InMemoryOrderStore, StoredOrder};
pub use service::{ConversationService, ServiceError};
pub use store::{OrderStore, StoreError};
