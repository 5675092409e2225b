//! medidir-pd library - Profile Directory service
//!
//! Stores one medical profile document per unique name with an optional
//! photo asset, and keeps the two consistent across create, update, fetch,
//! and delete.

pub mod api;
pub mod assets;
pub mod db;
pub mod error;
pub mod validate;

pub use crate::error::{ApiError, ApiResult};

use assets::AssetStore;
use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// File-backed photo asset store
    pub assets: AssetStore,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, assets: AssetStore) -> Self {
        Self {
            db,
            assets,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    // Multipart bodies carry up to a 5 MiB photo plus text fields; axum's
    // default 2 MB body cap would reject them before the asset store sees
    // the bytes.
    let body_limit = assets::MAX_PHOTO_BYTES + 64 * 1024;

    Router::new()
        .merge(api::profile_routes())
        .merge(api::health_routes())
        // Stored photos are retrievable under their public prefix
        .nest_service(
            assets::PUBLIC_PREFIX,
            ServeDir::new(state.assets.upload_dir()),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        // The directory serves a mobile client cross-origin
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
