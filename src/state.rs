//! Application state management
//!
//! This module defines the global application state that is shared across
//! all handlers and services: the document store, the token keys, and the
//! payment-gateway client.

use std::sync::Arc;

use crate::auth::TokenKeys;
use crate::config::Config;
use crate::infrastructure::{MongoStore, PaymentGateway, Store, StoreError};

/// Global application state
///
/// Holds the collaborator handles every request needs. It's designed to be
/// cheaply cloneable: the store sits behind an `Arc` and the other handles
/// clone shallowly.
#[derive(Clone)]
pub struct AppState {
    /// Document store holding services, bookings, users, and payments
    pub store: Arc<dyn Store>,

    /// Keys for issuing and verifying login tokens
    pub tokens: TokenKeys,

    /// Payment-intent gateway adapter
    pub gateway: PaymentGateway,
}

impl AppState {
    /// Production state: MongoDB store plus keys and gateway from `config`.
    pub async fn new(config: &Config) -> Result<Self, StoreError> {
        let store = MongoStore::connect(&config.mongodb_uri, &config.mongodb_db).await?;
        Ok(Self {
            store: Arc::new(store),
            tokens: TokenKeys::new(config.token_secret.as_bytes()),
            gateway: PaymentGateway::new(
                config.stripe_api_base.clone(),
                config.stripe_secret_key.clone(),
            ),
        })
    }

    /// State over an arbitrary store; tests hand in a `MemoryStore`.
    pub fn with_store(store: Arc<dyn Store>, tokens: TokenKeys, gateway: PaymentGateway) -> Self {
        Self {
            store,
            tokens,
            gateway,
        }
    }
}
