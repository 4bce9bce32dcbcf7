//! # Web Server
//!
//! Axum server hosting the adapter selected by configuration. The same binary
//! serves every backend; only the router differs.
//!
//! - [`routes`] - route tables per adapter
//! - [`handlers`] - thin request handlers over [`crate::adapters`]
//! - [`middleware`] - request ID, body limit, timeout, CORS, tracing
//! - [`state`] - shared adapter instances

pub mod handlers;
pub mod middleware;
pub mod response_types;
pub mod routes;
pub mod state;

pub use state::WebState;

use crate::error::Result;
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

/// Create the application router for the configured adapter
pub fn create_app(state: Arc<WebState>) -> Router {
    let router = routes::adapter_routes(state.kind).fallback(handlers::not_found);
    let app = middleware::apply_middleware_stack(router, &state.config).with_state(Arc::clone(&state));

    info!(adapter = %state.kind, "Web application created");
    app
}

/// Serve until `shutdown` completes, then drain in-flight requests
pub async fn serve<F>(listener: TcpListener, state: Arc<WebState>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let address = listener.local_addr()?;
    let app = create_app(state);

    info!(%address, "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("Server stopped");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C");
        },
        _ = terminate => {
            info!("Received SIGTERM");
        },
    }
}
