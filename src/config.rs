//! Environment-driven configuration
//!
//! Settings are read once at startup; defaults match what the deployment
//! has always used.

use anyhow::Context;

/// Runtime settings for the portal server.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub token_secret: String,
    pub stripe_secret_key: String,
    pub stripe_api_base: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().context("PORT must be a number")?,
            Err(_) => 4000,
        };
        Ok(Self {
            port,
            mongodb_uri: std::env::var("MONGODB_URI")
                .unwrap_or_else(|_| "mongodb://127.0.0.1:27017".to_string()),
            mongodb_db: std::env::var("MONGODB_DB")
                .unwrap_or_else(|_| "doctors_portal".to_string()),
            token_secret: std::env::var("TOKEN_SECRET").context("TOKEN_SECRET is required")?,
            stripe_secret_key: std::env::var("STRIPE_SECRET_KEY")
                .context("STRIPE_SECRET_KEY is required")?,
            stripe_api_base: std::env::var("STRIPE_API_BASE")
                .unwrap_or_else(|_| "https://api.stripe.com".to_string()),
        })
    }
}
