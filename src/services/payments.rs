//! Payment-intent creation through the gateway adapter.

use crate::error::ApiError;
use crate::infrastructure::PaymentGateway;
use crate::models::{CreateIntent, IntentSecret};

/// Ask the gateway for a card intent covering `request.price`.
pub async fn create_payment_intent(
    gateway: &PaymentGateway,
    request: CreateIntent,
) -> Result<IntentSecret, ApiError> {
    let intent = gateway.create_intent(request.price).await?;
    tracing::debug!("payment intent {} created", intent.id);
    Ok(IntentSecret {
        client_secret: intent.client_secret,
    })
}
