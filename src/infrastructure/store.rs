//! Document-store seam
//!
//! The operations the domain services need from persistence, behind a trait
//! so the HTTP surface can be driven against an in-memory store in tests.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    Admission, Booking, Payment, Service, ServiceName, UpdateOutcome, User, UserProfile,
};

/// Errors from the persistence collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
    #[error("store error: {0}")]
    Internal(String),
}

/// Document-store operations used by the domain services.
#[async_trait]
pub trait Store: Send + Sync {
    async fn list_services(&self) -> Result<Vec<Service>, StoreError>;
    async fn list_service_names(&self) -> Result<Vec<ServiceName>, StoreError>;
    async fn find_service_by_name(&self, name: &str) -> Result<Option<Service>, StoreError>;

    async fn bookings_for_date(&self, date: &str) -> Result<Vec<Booking>, StoreError>;
    async fn bookings_for_patient(&self, email: &str) -> Result<Vec<Booking>, StoreError>;
    async fn list_all_bookings(&self) -> Result<Vec<Booking>, StoreError>;
    async fn booking_by_id(&self, id: &str) -> Result<Option<Booking>, StoreError>;

    /// Insert `booking` unless one with the same (treatment, date, patient)
    /// triple exists. The decision is made inside the store, under its
    /// uniqueness guarantee, so concurrent duplicate submissions cannot
    /// both win.
    async fn insert_booking_unique(&self, booking: Booking) -> Result<Admission, StoreError>;

    /// Set `paid` and the transaction id on one booking and return the
    /// updated record, or `None` when the id matches nothing.
    async fn mark_booking_paid(
        &self,
        id: &str,
        transaction_id: &str,
    ) -> Result<Option<Booking>, StoreError>;

    /// Append a payment receipt.
    async fn record_payment(&self, payment: Payment) -> Result<(), StoreError>;

    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
    async fn find_user(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Create-or-update the account for `email`. A created account starts
    /// as a patient; an existing one keeps its role.
    async fn upsert_user(
        &self,
        email: &str,
        profile: &UserProfile,
    ) -> Result<UpdateOutcome, StoreError>;

    /// Grant the admin role; `matched_count` is zero when no such user
    /// exists.
    async fn promote_to_admin(&self, email: &str) -> Result<UpdateOutcome, StoreError>;
}
