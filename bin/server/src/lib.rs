//! reservation-relay webhook server.
//!
//! Accepts chat messages on `POST /webhook`, asks the NLU service for a
//! reply and walks each caller through the reservation dialogue.

pub mod cleanup;
pub mod config;
pub mod error;
pub mod payload;
pub mod routes;
pub mod session_key;
pub mod state;

use crate::config::ServerConfig;
use crate::error::StartupError;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Builds the HTTP router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhook", post(routes::webhook))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Runs the server until a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error if the NLU client can't be built, the listener can't
/// be bound or the server loop fails.
pub async fn run(config: ServerConfig) -> reservation_relay_core::Result<(), StartupError> {
    let nlu = config
        .nlu
        .build_client()
        .map_err(|e| StartupError::NluClient {
            details: e.to_string(),
        })?;
    tracing::info!(provider = %nlu.provider(), "NLU client ready");

    let state = Arc::new(AppState::new(nlu, config.session));
    let cleanup = cleanup::spawn_session_cleanup(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .map_err(|e| StartupError::Bind {
            addr: config.bind_addr.to_string(),
            details: e.to_string(),
        })?;

    tracing::info!("listening on http://{}", config.bind_addr);

    let served = axum::serve(listener, router(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await;
    cleanup.abort();

    served.map_err(|e| StartupError::Serve {
        details: e.to_string(),
    })?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown signal received");
}
