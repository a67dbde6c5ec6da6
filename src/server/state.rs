//! Application state management

use std::sync::Arc;

use sqlx::SqlitePool;

use super::realtime::RealtimeHub;
use crate::config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    db: SqlitePool,
    realtime: RealtimeHub,
}

impl AppState {
    pub fn new(config: Config, db: SqlitePool) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                db,
                realtime: RealtimeHub::new(),
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the database pool
    pub fn db(&self) -> &SqlitePool {
        &self.inner.db
    }

    /// Get the live update rooms
    pub fn realtime(&self) -> &RealtimeHub {
        &self.inner.realtime
    }
}
