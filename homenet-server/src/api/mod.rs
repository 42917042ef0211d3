//! HTTP handlers for homenet-server

pub mod ai;
pub mod fortune;
pub mod health;
pub mod listings;
pub mod pages;

pub use health::health_routes;

use crate::error::ApiError;

/// Fallback for a registered path hit with the wrong method
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Fallback for unregistered paths
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
