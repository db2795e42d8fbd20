//! Business logic services
//!
//! This module contains all the business logic of the application.
//! Services orchestrate domain operations and coordinate with infrastructure;
//! the HTTP layer above them stays thin.

pub mod availability;
pub mod booking;
pub mod catalog;
pub mod payments;
pub mod users;
