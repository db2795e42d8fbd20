//! Doctors Portal Booking Service Library
//!
//! This library provides all the core functionality for the booking backend:
//! the service catalog, per-date slot availability, booking admission with
//! payment confirmation, and account management. The binary wires it into an
//! HTTP server; tests drive the same router directly.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use models::*;
pub use state::AppState;
