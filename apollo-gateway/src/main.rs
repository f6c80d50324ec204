//! Entry point for the `apollo-gateway` HTTP server.

use std::sync::Arc;

use apollo_backend::{HttpBackend, TableBackend};
use apollo_gateway::{
    config::GatewayConfig,
    routes::{create_router, AppState},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let config = GatewayConfig::load();

    let default_filter = config.as_ref().map_or("info", GatewayConfig::default_log_filter);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match config {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let backend = match HttpBackend::new(&config.backend_url, config.backend_timeout()) {
        Ok(b) => b.with_max_response_bytes(config.backend_max_response_bytes),
        Err(e) => {
            tracing::error!(error = %e, "invalid backend configuration");
            std::process::exit(1);
        }
    };

    if let Err(e) = backend.health_check().await {
        tracing::warn!(error = %e, "backend not reachable yet; requests will fail until it is");
    }

    let app = create_router(AppState::new(Arc::new(backend), config.about.clone()));

    let listener = match tokio::net::TcpListener::bind(&config.listen_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(addr = %config.listen_addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    info!(
        addr = %config.listen_addr,
        backend = %config.backend_url,
        debug = config.debug,
        "apollo-gateway listening"
    );

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}
