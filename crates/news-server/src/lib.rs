//! REST API server: routes, validation and trace middleware, DTOs, and
//! OpenAPI documentation.

pub mod config;
pub mod docs;
pub mod dto;
pub mod error;
pub mod extract;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod trace;
pub mod validation;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use news_core::error::AppError;
use news_core::traits::CategoryStore;

pub use config::ServerConfig;
pub use state::AppState;

/// Build the complete application: routes plus the HTTP-level layers.
pub fn app<S: CategoryStore>(store: S, config: &ServerConfig) -> Result<Router, AppError> {
    let schemas = Arc::new(docs::schema_registry()?);
    let state = Arc::new(AppState::new(store, schemas, config.debug));

    Ok(routes::router(state)
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()))
}

/// Bind the configured port and serve until Ctrl+C or SIGTERM.
pub async fn serve<S: CategoryStore>(store: S, config: ServerConfig) -> anyhow::Result<()> {
    let app = app(store, &config)?;
    let addr = config.addr();

    tracing::info!(debug = config.debug, "Starting server on {addr}");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install CTRL+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
