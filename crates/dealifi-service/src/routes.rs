//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{candy_machines, health, merchants, metadata};
use crate::state::AppState;

/// Maximum concurrent requests for API endpoints.
const API_MAX_CONCURRENT_REQUESTS: usize = 100;

/// Maximum concurrent metadata uploads. Each one holds an image in memory.
const UPLOAD_MAX_CONCURRENT_REQUESTS: usize = 8;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// - `GET /health` - Health check
/// - `GET /api/merchants` - List merchants
/// - `GET /api/merchants/:address` - Get one merchant
/// - `POST /api/candy-machines/save` - Register a candy machine
/// - `POST /api/candy-machines/items` - Append config-line items
/// - `POST /api/candy-machines/minted` - Record a mint
/// - `POST /api/create-uri` - Upload image and token metadata
pub fn create_router(state: AppState) -> Router {
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    let upload_routes = Router::new()
        .route("/create-uri", post(metadata::create_uri))
        .layer(ConcurrencyLimitLayer::new(UPLOAD_MAX_CONCURRENT_REQUESTS));

    let api_routes = Router::new()
        .route("/merchants", get(merchants::list_merchants))
        .route("/merchants/:address", get(merchants::get_merchant))
        .route("/candy-machines/save", post(candy_machines::save_candy_machine))
        .route(
            "/candy-machines/items",
            post(candy_machines::save_candy_machine_items),
        )
        .route("/candy-machines/minted", post(candy_machines::record_mint))
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS))
        .merge(upload_routes);

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
