//! HTTP request handlers
//!
//! This module contains all the HTTP endpoint handlers and the router that
//! wires them up. Each handler extracts request data and, where required,
//! the caller's verified `Identity`, then delegates to a service.
//! Authorization decisions live here; the services stay ignorant of HTTP.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};
use std::collections::HashMap;
use tower_http::cors::CorsLayer;

use crate::auth::Identity;
use crate::error::ApiError;
use crate::models::*;
use crate::services::{availability, booking, catalog, payments, users};
use crate::state::AppState;

/// Assemble the full route table over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/services", get(list_services))
        .route("/services/names", get(list_service_names))
        .route("/services/{name}", get(get_service))
        .route("/available", get(available))
        .route("/bookings", get(patient_bookings).post(submit_booking))
        .route("/bookings/all", get(all_bookings))
        .route("/bookings/{id}", get(booking_by_id).patch(confirm_payment))
        .route("/payments/create-intent", post(create_payment_intent))
        .route("/users", get(list_users))
        .route("/users/{email}", put(upsert_user))
        .route("/users/{email}/admin", get(admin_status).put(promote_user))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Root endpoint - simple liveness greeting
pub async fn root() -> &'static str {
    "Hello World!"
}

/// Full service catalog.
pub async fn list_services(
    State(state): State<AppState>,
) -> Result<Json<Vec<Service>>, ApiError> {
    Ok(Json(catalog::list_services(state.store.as_ref()).await?))
}

/// Catalog projected down to service names.
pub async fn list_service_names(
    State(state): State<AppState>,
) -> Result<Json<Vec<ServiceName>>, ApiError> {
    Ok(Json(
        catalog::list_service_names(state.store.as_ref()).await?,
    ))
}

/// One catalog entry by its exact name.
pub async fn get_service(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Service>, ApiError> {
    Ok(Json(
        catalog::get_service_by_name(state.store.as_ref(), &name).await?,
    ))
}

/// Open slots per service for the date in `?date=`.
pub async fn available(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<ServiceAvailability>>, ApiError> {
    let date = params.get("date").cloned().unwrap_or_default();
    Ok(Json(
        availability::compute_availability(state.store.as_ref(), &date).await?,
    ))
}

/// Submit a booking
///
/// A duplicate (treatment, date, patient) answers 200 with
/// `admitted: false` and the existing record; that outcome is not an error.
pub async fn submit_booking(
    State(state): State<AppState>,
    Json(request): Json<BookingRequest>,
) -> Result<Json<BookingOutcome>, ApiError> {
    let admission = booking::submit_booking(state.store.as_ref(), request).await?;
    Ok(Json(admission.into()))
}

/// A patient's own bookings; the `?email=` filter must match the caller.
pub async fn patient_bookings(
    State(state): State<AppState>,
    identity: Identity,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Booking>>, ApiError> {
    let email = params.get("email").cloned().unwrap_or_default();
    if identity.email != email {
        return Err(ApiError::forbidden("Forbidden access"));
    }
    Ok(Json(
        booking::list_bookings_for_patient(state.store.as_ref(), &email).await?,
    ))
}

/// Every booking in the system; admin only.
pub async fn all_bookings(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<Vec<Booking>>, ApiError> {
    if !identity.is_admin() {
        return Err(ApiError::forbidden("Admin access required"));
    }
    Ok(Json(booking::list_all_bookings(state.store.as_ref()).await?))
}

/// One booking; visible to its patient and to admins.
pub async fn booking_by_id(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<Booking>, ApiError> {
    let found = booking::get_booking_by_id(state.store.as_ref(), &id).await?;
    if found.patient != identity.email && !identity.is_admin() {
        return Err(ApiError::forbidden("Forbidden access"));
    }
    Ok(Json(found))
}

/// Record a gateway receipt against a booking and mark it paid.
pub async fn confirm_payment(
    State(state): State<AppState>,
    _identity: Identity,
    Path(id): Path<String>,
    Json(receipt): Json<PaymentReceipt>,
) -> Result<Json<Booking>, ApiError> {
    Ok(Json(
        booking::confirm_payment(state.store.as_ref(), &id, receipt).await?,
    ))
}

/// Create a payment intent for the amount the patient is about to pay.
pub async fn create_payment_intent(
    State(state): State<AppState>,
    _identity: Identity,
    Json(request): Json<CreateIntent>,
) -> Result<Json<IntentSecret>, ApiError> {
    Ok(Json(
        payments::create_payment_intent(&state.gateway, request).await?,
    ))
}

/// Every registered user; admin only.
pub async fn list_users(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<Vec<User>>, ApiError> {
    if !identity.is_admin() {
        return Err(ApiError::forbidden("Admin access required"));
    }
    Ok(Json(users::list_users(state.store.as_ref()).await?))
}

/// Login upsert: create-or-update the account and issue a token.
pub async fn upsert_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(profile): Json<UserProfile>,
) -> Result<Json<UpsertedUser>, ApiError> {
    Ok(Json(
        users::upsert_user(state.store.as_ref(), &state.tokens, &email, profile).await?,
    ))
}

/// Grant the admin role; the caller must already hold it.
pub async fn promote_user(
    State(state): State<AppState>,
    identity: Identity,
    Path(email): Path<String>,
) -> Result<Json<UpdateOutcome>, ApiError> {
    if !identity.is_admin() {
        return Err(ApiError::forbidden(
            "You do not have permission to make an admin",
        ));
    }
    Ok(Json(
        users::promote_to_admin(state.store.as_ref(), &email).await?,
    ))
}

/// Whether `email` holds the admin role; callers may only ask about
/// themselves.
pub async fn admin_status(
    State(state): State<AppState>,
    identity: Identity,
    Path(email): Path<String>,
) -> Result<Json<AdminStatus>, ApiError> {
    if identity.email != email {
        return Err(ApiError::forbidden("Forbidden access"));
    }
    Ok(Json(AdminStatus {
        admin: users::is_admin(state.store.as_ref(), &email).await?,
    }))
}
