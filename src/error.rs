//! API error type and its HTTP mapping
//!
//! One error voice for the operation surface. Duplicate bookings are not an
//! error: submission answers with a structured outcome instead.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::infrastructure::{GatewayError, StoreError};

/// Errors the operation surface can answer with.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No identity presented.
    #[error("Unauthorized access")]
    Unauthorized,
    /// Identity present but not allowed to perform the operation.
    #[error("{0}")]
    Forbidden(String),
    /// A referenced booking, service, or user does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// A persistence or payment-gateway collaborator failed.
    #[error("upstream failure: {0}")]
    Upstream(String),
}

impl ApiError {
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {self}");
        }
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::Upstream(err.to_string())
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        Self::Upstream(err.to_string())
    }
}
