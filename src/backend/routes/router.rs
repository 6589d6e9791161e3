/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 *
 * # Layers
 *
 * 1. `auth_middleware` as a route layer on the authenticated routes only
 * 2. CORS for the configured origins, permissive when none are set
 * 3. `TraceLayer` for request logging
 *
 * Unknown routes answer a JSON 404.
 */

use axum::{http::HeaderValue, middleware, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::backend::error::BackendError;
use crate::backend::middleware::auth_middleware;
use crate::backend::routes::api_routes::{configure_api_routes, configure_public_routes};
use crate::backend::server::config::ServerConfig;
use crate::backend::server::state::AppState;

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    let protected = configure_api_routes(Router::new())
        .route_layer(middleware::from_fn_with_state(app_state.clone(), auth_middleware));

    configure_public_routes(Router::new())
        .merge(protected)
        .fallback(|| async { BackendError::NotFound("Route") })
        .layer(cors_layer(&app_state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
