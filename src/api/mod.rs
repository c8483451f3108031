//! REST API server module
//!
//! A thin HTTP surface over [`MediaDownloader`]: resolve-and-download by identifier,
//! catalog search, health and an event stream.

use crate::{Config, MediaDownloader, Result};
use axum::{Router, http::HeaderValue, middleware, routing::get};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Media
/// - `GET /id/:media_id` - Classify, resolve and download an identifier
/// - `GET /search?q=&type=` - Search tracks, albums or artists
///
/// ## System
/// - `GET /` - Banner
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
/// - `GET /events` - Server-sent events stream
pub fn create_router(downloader: Arc<MediaDownloader>, config: Arc<Config>) -> Router {
    let state = AppState::new(downloader, config.clone());

    let router = Router::new()
        // Media
        .route("/id/:media_id", get(routes::download_media))
        .route("/search", get(routes::search))
        // System
        .route("/", get(routes::banner))
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec))
        .route("/events", get(routes::event_stream));

    // Swagger UI reuses the spec served at /openapi.json
    let router = if config.api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router.with_state(state);

    let router = if config.api.api_key.is_some() {
        router.layer(middleware::from_fn_with_state(
            config.api.api_key.clone(),
            auth::require_api_key,
        ))
    } else {
        router
    };

    let router = router.layer(TraceLayer::new_for_http());

    if config.api.cors_enabled {
        router.layer(build_cors_layer(&config.api.cors_origins))
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins; `"*"` or an empty list allows any origin
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    let layer = if allow_any || origins.is_empty() {
        CorsLayer::new().allow_origin(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new().allow_origin(AllowOrigin::list(allowed))
    };
    layer.allow_methods(Any).allow_headers(Any)
}

/// Start the API server on the configured bind address.
///
/// Runs until SIGINT or SIGTERM is received, then stops accepting connections
/// and waits for in-flight requests to finish.
///
/// # Example
///
/// ```no_run
/// use tidal_relay::{Config, MediaDownloader};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let downloader = Arc::new(MediaDownloader::new((*config).clone()).await?);
///
/// tidal_relay::api::start_api_server(downloader, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(downloader: Arc<MediaDownloader>, config: Arc<Config>) -> Result<()> {
    let bind_address = config.api.bind_address;

    tracing::info!(address = %bind_address, "Starting API server");

    let app = create_router(downloader, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(address = %bind_address, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
