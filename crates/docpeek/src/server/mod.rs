//! HTTP server for the preview service

pub mod routes;
pub mod state;

use axum::{routing::get, Router};
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::PreviewConfig;
use crate::error::{Error, Result};
use state::AppState;

/// Build the router with all routes
pub fn create_router(state: AppState) -> Router {
    let config = state.config().clone();

    let router = Router::new()
        // Front-end
        .route("/", get(routes::frontend::index))
        .nest_service("/static", ServeDir::new(&config.frontend.static_dir))
        // Health check
        .route("/health", get(health_check))
        // Upload with body limit for multipart uploads
        .merge(routes::upload_routes(config.server.max_upload_size))
        .nest("/api", routes::api_routes())
        .with_state(state)
        // Middleware layers (order matters - applied bottom to top)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    if config.server.enable_cors {
        // CORS layer - must be added last (outermost)
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        router.layer(cors)
    } else {
        router
    }
}

/// Preview HTTP server
pub struct PreviewServer {
    config: PreviewConfig,
    state: AppState,
}

impl PreviewServer {
    /// Create a new server
    pub fn new(config: PreviewConfig) -> Result<Self> {
        config.validate()?;
        let state = AppState::new(config.clone());
        Ok(Self { config, state })
    }

    /// Create with default configuration
    pub fn with_defaults() -> Result<Self> {
        Self::new(PreviewConfig::default())
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self
            .address()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address: {}", e)))?;

        let router = create_router(self.state);

        tracing::info!("Starting preview server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Config(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| Error::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.server.host, self.config.server.port)
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
