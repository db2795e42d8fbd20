//! Domain models and data structures
//!
//! This module contains all the core data types used throughout the application.
//! These are "pure" data structures without business logic. Field renames match
//! the wire and document names the portal has always used.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bookable treatment: its name, slot template, and price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    pub slots: Vec<String>,
    pub price: Decimal,
}

/// Name-only projection of a service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceName {
    pub name: String,
}

/// A service annotated with the slots still open on the requested date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceAvailability {
    #[serde(flatten)]
    pub service: Service,
    pub available: Vec<String>,
}

/// A patient's reservation of one slot of one service on one date.
///
/// Mutated only when payment is confirmed; `paid` and `transactionId` are
/// the only fields that ever change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "treatmentName")]
    pub treatment_name: String,
    #[serde(rename = "treatmentDate")]
    pub treatment_date: String,
    pub patient: String,
    pub slot: String,
    #[serde(default)]
    pub paid: bool,
    #[serde(rename = "transactionId", skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

/// Booking submission from clients.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    #[serde(rename = "treatmentName")]
    pub treatment_name: String,
    #[serde(rename = "treatmentDate")]
    pub treatment_date: String,
    pub patient: String,
    pub slot: String,
}

impl BookingRequest {
    /// Materialize an unpaid booking with a fresh id.
    pub fn into_booking(self) -> Booking {
        Booking {
            id: Uuid::new_v4().to_string(),
            treatment_name: self.treatment_name,
            treatment_date: self.treatment_date,
            patient: self.patient,
            slot: self.slot,
            paid: false,
            transaction_id: None,
        }
    }
}

/// Outcome of the uniqueness-checked booking insert.
#[derive(Debug, Clone)]
pub enum Admission {
    /// The booking was new and has been persisted.
    Admitted(Booking),
    /// A booking with the same (treatment, date, patient) already exists;
    /// nothing was written.
    Rejected(Booking),
}

/// Submission response: the admitted booking, or the existing record when
/// the request duplicated one.
#[derive(Debug, Clone, Serialize)]
pub struct BookingOutcome {
    pub admitted: bool,
    pub booking: Booking,
}

impl From<Admission> for BookingOutcome {
    fn from(admission: Admission) -> Self {
        match admission {
            Admission::Admitted(booking) => Self {
                admitted: true,
                booking,
            },
            Admission::Rejected(booking) => Self {
                admitted: false,
                booking,
            },
        }
    }
}

/// Gateway receipt presented by the client when confirming payment.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentReceipt {
    #[serde(rename = "transactionId")]
    pub transaction_id: String,
    pub amount: Decimal,
}

/// Append-only payment record, written once per successful confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(rename = "bookingId")]
    pub booking_id: String,
    pub amount: Decimal,
    #[serde(rename = "transactionId")]
    pub transaction_id: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Access level attached to a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Patient,
    Admin,
}

/// A portal account; created or refreshed on every login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Profile fields accepted by the login upsert.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserProfile {
    pub name: Option<String>,
    pub phone: Option<String>,
}

/// Summary of a user write, mirroring the driver's update result.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateOutcome {
    #[serde(rename = "matchedCount")]
    pub matched_count: u64,
    #[serde(rename = "modifiedCount")]
    pub modified_count: u64,
    pub upserted: bool,
}

/// Login-upsert response: the write summary plus a fresh access token.
#[derive(Debug, Clone, Serialize)]
pub struct UpsertedUser {
    pub result: UpdateOutcome,
    pub token: String,
}

/// Answer to "does this account hold the admin role".
#[derive(Debug, Clone, Serialize)]
pub struct AdminStatus {
    pub admin: bool,
}

/// Payment-intent request carrying the price the patient is about to pay.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateIntent {
    pub price: Decimal,
}

/// Client-usable secret returned by the payment gateway.
#[derive(Debug, Clone, Serialize)]
pub struct IntentSecret {
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
}
