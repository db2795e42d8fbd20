//! Account upserts, role queries, and admin promotion.

use crate::auth::TokenKeys;
use crate::error::ApiError;
use crate::infrastructure::Store;
use crate::models::{Role, UpdateOutcome, UpsertedUser, User, UserProfile};

/// Create-or-update the account on login and hand back a fresh token.
pub async fn upsert_user(
    store: &dyn Store,
    keys: &TokenKeys,
    email: &str,
    profile: UserProfile,
) -> Result<UpsertedUser, ApiError> {
    let result = store.upsert_user(email, &profile).await?;
    if result.upserted {
        tracing::info!("user {email} created");
    }
    let token = keys
        .issue(email)
        .map_err(|err| ApiError::Upstream(format!("token issue failed: {err}")))?;
    Ok(UpsertedUser { result, token })
}

pub async fn list_users(store: &dyn Store) -> Result<Vec<User>, ApiError> {
    Ok(store.list_users().await?)
}

/// Grant the admin role to an existing account.
pub async fn promote_to_admin(store: &dyn Store, email: &str) -> Result<UpdateOutcome, ApiError> {
    let result = store.promote_to_admin(email).await?;
    if result.matched_count == 0 {
        return Err(ApiError::NotFound("User"));
    }
    tracing::info!("user {email} promoted to admin");
    Ok(result)
}

/// Whether the account holds the admin role; an unknown email is not an
/// admin.
pub async fn is_admin(store: &dyn Store, email: &str) -> Result<bool, ApiError> {
    Ok(store
        .find_user(email)
        .await?
        .map(|user| user.role == Role::Admin)
        .unwrap_or(false))
}
