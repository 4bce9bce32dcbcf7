//! # Web Request Handlers
//!
//! Thin axum handlers; the protocol work lives in [`crate::adapters`].

pub mod actions;
pub mod batch;
pub mod functions;
pub mod health;
pub mod predict;

use axum::http::Uri;

use crate::web::response_types::ApiError;

/// Fallback for unmatched routes
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(uri.path())
}
