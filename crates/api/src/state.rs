use std::sync::Arc;

use crate::config::ServerConfig;
use crate::engine::scheduler::FrameScheduler;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: lens_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Frame assignment engine. One instance per process; all handlers
    /// route assignment and annotation writes through it.
    pub scheduler: Arc<FrameScheduler>,
}
