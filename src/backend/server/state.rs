/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * The `AppState` struct serves as the central state container for the
 * application, holding:
 * - The board store (PostgreSQL or in-memory)
 * - Per-board broadcast channels for the relay
 * - Token signing keys
 * - The loaded configuration
 *
 * Everything is cheap to clone and shared across handlers; there is no
 * process-global state.
 */

use std::sync::Arc;

use axum::extract::FromRef;

use crate::backend::auth::sessions::SessionKeys;
use crate::backend::realtime::BoardChannels;
use crate::backend::server::config::ServerConfig;
use crate::backend::store::BoardStore;

/// Central state container for the Axum application
#[derive(Clone)]
pub struct AppState {
    /// Persistence for users, tasks and activity
    pub store: Arc<dyn BoardStore>,

    /// Broadcast channels, one per board
    pub channels: BoardChannels,

    /// Bearer token keys
    pub sessions: SessionKeys,

    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Assemble state around an already-initialized store
    pub fn new(config: ServerConfig, store: Arc<dyn BoardStore>) -> Self {
        Self {
            store,
            channels: BoardChannels::new(config.event_channel_capacity),
            sessions: SessionKeys::new(&config.jwt_secret, config.token_ttl),
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for Arc<dyn BoardStore> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.store.clone()
    }
}

impl FromRef<AppState> for BoardChannels {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.channels.clone()
    }
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.sessions.clone()
    }
}
