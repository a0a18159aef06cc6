pub mod extract;
pub mod response;

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tokio::{signal, sync::Notify};
use tower_http::compression::CompressionLayer;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::features::{self, FeatureState};
use crate::middleware;
use crate::store::StoreGateway;

/// Bind the configured address and serve until a shutdown signal
///
/// After the signal, in-flight requests get `shutdown_timeout_secs` to finish
/// before the server stops waiting for them.
pub async fn serve(config: Config, gateway: StoreGateway) -> anyhow::Result<()> {
    let app = create_router(gateway, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let signalled = Arc::new(Notify::new());
    let server = axum::serve(listener, app).with_graceful_shutdown({
        let signalled = Arc::clone(&signalled);
        async move {
            shutdown_signal().await;
            signalled.notify_one();
        }
    });

    let drain = Duration::from_secs(config.server.shutdown_timeout_secs);
    let deadline = async {
        signalled.notified().await;
        tracing::info!("Waiting up to {} seconds for connections to close", drain.as_secs());
        tokio::time::sleep(drain).await;
    };

    tokio::select! {
        result = server.into_future() => result?,
        _ = deadline => tracing::warn!("Shutdown timeout elapsed, dropping open connections"),
    }

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Create the application router with all routes and middleware
pub fn create_router(gateway: StoreGateway, config: &Config) -> Router {
    let state = FeatureState::new(gateway, config.codec.decode_policy);

    Router::new()
        .route("/health", get(health_check))
        .with_state(state.clone())
        .merge(features::router(state))
        // Apply layers from innermost to outermost
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

/// Health check handler
async fn health_check(State(gateway): State<StoreGateway>) -> AppResult<Response> {
    gateway
        .ping()
        .await
        .map_err(|e| AppError::Unavailable(e.to_string()))?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "store": "connected"
        })),
    )
        .into_response())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, starting graceful shutdown");
        },
    }
}
