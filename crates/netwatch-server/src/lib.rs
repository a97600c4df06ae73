//! netwatch API server.
//!
//! Serves every lookup in [`netwatch_intel`] as a JSON endpoint:
//!
//! ```text
//! GET  /health
//! GET  /ip-lookup?target=8.8.8.8
//! GET  /reputation?ip=8.8.8.8
//! GET  /domain-whois?domain=example.com
//! GET  /domain-reputation?domain=example.com
//! POST /hash-lookup        {"hash": "..."}
//! POST /email-check        {"email": "..."}
//! GET  /ssl-check?target=example.com
//! GET  /feeds
//! GET  /feeds/{urlhaus,alienvault,phishtank}
//! GET  /news?q=ransomware
//! GET  /latency-check?target=example.com
//! ```

pub mod cli;
pub mod config;
pub mod error;
mod handlers;

use axum::routing::{get, post};
use axum::Router;
use netwatch_intel::Intel;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use config::ServerConfig;
pub use error::{ApiError, Result, ServerError};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    intel: Arc<Intel>,
}

/// Build the router over a set of lookup services
pub fn router(intel: Arc<Intel>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/ip-lookup", get(handlers::ip_lookup))
        .route("/reputation", get(handlers::reputation))
        .route("/domain-whois", get(handlers::domain_whois))
        .route("/domain-reputation", get(handlers::domain_reputation))
        .route("/hash-lookup", post(handlers::hash_lookup))
        .route("/email-check", post(handlers::email_check))
        .route("/ssl-check", get(handlers::ssl_check))
        .route("/feeds", get(handlers::feeds))
        .route("/feeds/:feed", get(handlers::feed))
        .route("/news", get(handlers::news))
        .route("/latency-check", get(handlers::latency_check))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(AppState { intel })
}

/// Build the lookup services, bind the listener and serve until ctrl-c
pub async fn run(config: ServerConfig) -> Result<()> {
    let intel = Arc::new(Intel::from_config(&config.providers)?);

    let listener = TcpListener::bind(config.listen)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.listen,
            source,
        })?;
    info!(addr = %config.listen, "netwatch listening");

    axum::serve(listener, router(intel))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("netwatch stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
