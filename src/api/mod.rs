//! HTTP interface (axum).
//!
//! Routes live under `/api/v1`. Every handler takes its [`RequestContext`]
//! from the request headers (see [`context`]) and delegates to `crate::core`.
//! Bodies, queries and paths go through [`extract`], so every rejection carries
//! the same error body as a domain error.
//!
//! [`RequestContext`]: crate::core::context::RequestContext

pub mod context;
pub mod error;
pub mod extract;

mod dining;
mod health;
mod hr;
mod payments;
mod rate_plans;
mod reservations;
mod rooms;
mod services;

use crate::{config::app::AppConfig, core::clock::Clock};
use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    /// Connection pool
    pub db: Arc<DatabaseConnection>,
    /// Time source for every time-dependent operation
    pub clock: Arc<dyn Clock>,
    /// Loaded configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Bundles the pieces handlers need.
    pub fn new(db: DatabaseConnection, clock: Arc<dyn Clock>, config: AppConfig) -> Self {
        Self {
            db: Arc::new(db),
            clock,
            config: Arc::new(config),
        }
    }
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    let v1 = Router::new()
        .merge(health::routes())
        .merge(reservations::routes())
        .merge(payments::routes())
        .merge(rate_plans::routes())
        .merge(rooms::routes())
        .merge(services::routes())
        .merge(dining::routes())
        .merge(hr::routes());

    Router::new()
        .nest("/api/v1", v1)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
