//! Login tokens and request identity
//!
//! Tokens are HS256-signed with the account email as the subject. The
//! `Identity` extractor turns the `Authorization` header into an explicit
//! `{email, role}` value that handlers pass down; nothing below the HTTP
//! layer reads request context.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::Role;
use crate::state::AppState;

/// Logins stay valid for one day.
const TOKEN_TTL_HOURS: i64 = 24;

/// Signed-token claims; the subject is the account email.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// HS256 key pair for issuing and verifying login tokens.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Issue a token for `email`.
    pub fn issue(&self, email: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let expires = Utc::now() + chrono::Duration::hours(TOKEN_TTL_HOURS);
        let claims = Claims {
            sub: email.to_string(),
            exp: expires.timestamp() as usize,
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Verify a token and return its subject email.
    pub fn verify(&self, token: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims.sub)
    }
}

/// Verified caller identity, threaded explicitly into every operation.
#[derive(Debug, Clone)]
pub struct Identity {
    pub email: String,
    pub role: Role,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl FromRequestParts<AppState> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::forbidden("Forbidden access"))?;
        let email = state.tokens.verify(token).map_err(|err| {
            tracing::debug!("token rejected: {err}");
            ApiError::forbidden("Forbidden access")
        })?;
        // The role is read fresh on every request so a promotion takes
        // effect without a re-login.
        let role = match state.store.find_user(&email).await? {
            Some(user) => user.role,
            None => Role::Patient,
        };
        Ok(Identity { email, role })
    }
}
