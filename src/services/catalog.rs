//! Service catalog reads.

use crate::error::ApiError;
use crate::infrastructure::Store;
use crate::models::{Service, ServiceName};

pub async fn list_services(store: &dyn Store) -> Result<Vec<Service>, ApiError> {
    Ok(store.list_services().await?)
}

pub async fn list_service_names(store: &dyn Store) -> Result<Vec<ServiceName>, ApiError> {
    Ok(store.list_service_names().await?)
}

pub async fn get_service_by_name(store: &dyn Store, name: &str) -> Result<Service, ApiError> {
    store
        .find_service_by_name(name)
        .await?
        .ok_or(ApiError::NotFound("Service"))
}
