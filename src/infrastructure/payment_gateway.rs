use std::time::Duration;

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use thiserror::Error;

static CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .pool_max_idle_per_host(50)
        .connect_timeout(Duration::from_secs(5))
        .timeout(Duration::from_secs(30))
        .build()
        .expect("Failed to build reqwest client")
});

/// Errors from the payment-intent call.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("gateway refused the request: status {status}: {body}")]
    Provider { status: u16, body: String },
    #[error("amount {0} cannot be charged")]
    InvalidAmount(Decimal),
}

/// Provider-side intent; the id doubles as the receipt transaction id.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

/// Thin adapter over a Stripe-style payment-intents endpoint.
#[derive(Clone)]
pub struct PaymentGateway {
    api_base: String,
    secret_key: String,
}

impl PaymentGateway {
    pub fn new(api_base: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            secret_key: secret_key.into(),
        }
    }

    /// Create a card payment intent for `amount` (major units, USD).
    pub async fn create_intent(&self, amount: Decimal) -> Result<PaymentIntent, GatewayError> {
        let cents = amount_to_cents(amount).ok_or(GatewayError::InvalidAmount(amount))?;
        let url = format!("{}/v1/payment_intents", self.api_base);
        let response = CLIENT
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(&[
                ("amount", cents.to_string()),
                ("currency", "usd".to_string()),
                ("payment_method_types[]", "card".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("payment intent refused: status {status}: {body}");
            return Err(GatewayError::Provider {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}

/// The gateway charges integer cents. Scaling is checked: an amount too
/// large to express in cents is refused, not a panic.
fn amount_to_cents(amount: Decimal) -> Option<i64> {
    amount
        .checked_mul(Decimal::from(100))?
        .round()
        .to_i64()
        .filter(|cents| *cents > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_major_units_to_cents() {
        assert_eq!(amount_to_cents(Decimal::from(30)), Some(3000));
        assert_eq!(amount_to_cents(Decimal::new(995, 2)), Some(995));
        assert_eq!(amount_to_cents(Decimal::ZERO), None);
        assert_eq!(amount_to_cents(Decimal::from(-5)), None);
        assert_eq!(amount_to_cents(Decimal::MAX), None);
    }

    #[tokio::test]
    async fn creates_an_intent_and_returns_the_client_secret() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/payment_intents")
            .match_header("authorization", "Bearer sk_test_key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"pi_123","client_secret":"pi_123_secret_abc"}"#)
            .create_async()
            .await;

        let gateway = PaymentGateway::new(server.url(), "sk_test_key");
        let intent = gateway
            .create_intent(Decimal::from(30))
            .await
            .expect("intent");
        assert_eq!(intent.id, "pi_123");
        assert_eq!(intent.client_secret, "pi_123_secret_abc");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn surfaces_a_provider_refusal() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/payment_intents")
            .with_status(402)
            .with_body(r#"{"error":{"message":"card declined"}}"#)
            .create_async()
            .await;

        let gateway = PaymentGateway::new(server.url(), "sk_test_key");
        let err = gateway
            .create_intent(Decimal::from(10))
            .await
            .expect_err("refusal");
        match err {
            GatewayError::Provider { status, .. } => assert_eq!(status, 402),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn refuses_to_charge_a_zero_amount() {
        let gateway = PaymentGateway::new("http://127.0.0.1:9", "sk_test_key");
        let err = gateway
            .create_intent(Decimal::ZERO)
            .await
            .expect_err("invalid amount");
        assert!(matches!(err, GatewayError::InvalidAmount(_)));
    }

    #[tokio::test]
    async fn refuses_an_amount_too_large_to_scale_to_cents() {
        // A price clients can submit as plain JSON, e.g. 1e27, fits a
        // `Decimal` but overflows when scaled by 100.
        let price = Decimal::from_scientific("1e27").expect("decimal");
        let gateway = PaymentGateway::new("http://127.0.0.1:9", "sk_test_key");
        let err = gateway
            .create_intent(price)
            .await
            .expect_err("invalid amount");
        assert!(matches!(err, GatewayError::InvalidAmount(_)));
    }
}
