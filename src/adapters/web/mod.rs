//! HTTP API adapter.
//!
//! Thin axum layer: validates query parameters, runs the ledger call off the
//! async runtime, and maps results and errors to JSON.

mod error;
mod handlers;
mod params;

pub use error::ApiError;
pub use handlers::*;
pub use params::{PositionsParams, TradesParams};

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::ports::ledger_port::LedgerPort;

pub struct AppState {
    pub ledger: Arc<dyn LedgerPort + Send + Sync>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/trades", get(handlers::list_trades))
        .route("/positions", get(handlers::list_positions))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}
