//! Infrastructure layer
//!
//! This module contains all external dependencies and infrastructure concerns.
//! It provides the document store behind the `Store` seam and the
//! payment-gateway client.

pub mod memory;
pub mod mongo;
pub mod payment_gateway;
pub mod store;

pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use payment_gateway::{GatewayError, PaymentGateway, PaymentIntent};
pub use store::{Store, StoreError};
