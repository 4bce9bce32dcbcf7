//! # Web API Error Types
//!
//! Failures raised by the HTTP layer itself, rendered with the same
//! envelope the adapters use.

use crate::adapters::rest::{status_for, ErrorEnvelope};
use crate::error::FoundryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Resource not found: {path}")]
    NotFound { path: String },

    #[error(transparent)]
    Foundry(#[from] FoundryError),
}

impl ApiError {
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, envelope) = match &self {
            ApiError::NotFound { .. } => (
                StatusCode::NOT_FOUND,
                ErrorEnvelope::new("NOT_FOUND", self.to_string(), None),
            ),
            ApiError::Foundry(error) => (status_for(error), ErrorEnvelope::from_error(error)),
        };
        (status, Json(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
