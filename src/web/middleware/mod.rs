//! # Web Middleware
//!
//! Stack applied to every adapter router, outermost last:
//! request ID, body limit, timeout, CORS, tracing.

pub mod request_id;

use crate::config::RuntimeConfig;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::{middleware, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

pub fn apply_middleware_stack<S>(router: Router<S>, config: &RuntimeConfig) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(middleware::from_fn(request_id::add_request_id))
        .layer(DefaultBodyLimit::max(config.max_request_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout(),
        ))
        .layer(create_cors_layer())
        .layer(TraceLayer::new_for_http())
}

fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
