/**
 * Server Initialization
 *
 * This module handles the initialization and setup of the Axum HTTP server,
 * including state creation, store loading, and route configuration.
 *
 * # Initialization Process
 *
 * 1. Load the store (PostgreSQL, falling back to memory)
 * 2. Build `AppState` with channels and token keys
 * 3. Create and configure the router
 * 4. Start the periodic sweep of idle board channels
 */

use axum::Router;

use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_store, ServerConfig};
use crate::backend::server::state::AppState;

/// Create and configure the Axum application
///
/// The server keeps running when storage setup fails; see `load_store`.
pub async fn create_app(config: ServerConfig) -> Router<()> {
    tracing::info!("Initializing task board server");

    let store = load_store(&config).await;
    tracing::info!("Using {} storage", store.backend_name());

    let state = AppState::new(config, store);
    spawn_channel_cleanup(&state);
    create_router(state)
}

/// Router over an existing state, without background tasks
pub fn create_app_with_state(state: AppState) -> Router<()> {
    create_router(state)
}

fn spawn_channel_cleanup(state: &AppState) {
    let channels = state.channels.clone();
    let period = state.config.channel_cleanup_interval;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // the first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            let removed = channels.cleanup_inactive_channels();
            if removed > 0 {
                tracing::debug!("Cleaned up {} inactive board channels", removed);
            }
        }
    });
    tracing::info!("Router configured with periodic cleanup task");
}
