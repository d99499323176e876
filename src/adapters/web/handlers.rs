//! HTTP request handlers for the web adapter.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::Uri,
};
use serde::Serialize;
use std::sync::Arc;

use crate::domain::error::LedgerError;
use crate::domain::position::Position;
use crate::domain::trade::Trade;
use crate::ports::ledger_port::LedgerPort;

use super::{ApiError, AppState, PositionsParams, TradesParams};

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub message: &'static str,
    pub version: &'static str,
    pub status: &'static str,
}

pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "Trades & Positions",
        version: env!("CARGO_PKG_VERSION"),
        status: "running",
    })
}

pub async fn list_trades(
    State(state): State<Arc<AppState>>,
    params: Result<Query<TradesParams>, QueryRejection>,
) -> Result<Json<Vec<Trade>>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::unprocessable(e.body_text()))?;
    let filter = params.into_filter()?;
    tracing::debug!(?filter, "list trades");

    let trades = run_blocking(&state, move |ledger| ledger.list_trades(&filter)).await?;
    Ok(Json(trades))
}

pub async fn list_positions(
    State(state): State<Arc<AppState>>,
    params: Result<Query<PositionsParams>, QueryRejection>,
) -> Result<Json<Vec<Position>>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::unprocessable(e.body_text()))?;
    let filter = params.into_filter()?;
    tracing::debug!(?filter, "list positions");

    let positions = run_blocking(&state, move |ledger| ledger.list_positions(&filter)).await?;
    Ok(Json(positions))
}

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("no route for {}", uri.path()))
}

/// Runs a synchronous ledger call on the blocking pool.
async fn run_blocking<T, F>(state: &Arc<AppState>, call: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&(dyn LedgerPort + Send + Sync)) -> Result<T, LedgerError> + Send + 'static,
{
    let ledger = Arc::clone(&state.ledger);
    match tokio::task::spawn_blocking(move || call(ledger.as_ref())).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(e) => {
            tracing::error!(error = %e, "ledger task failed");
            Err(ApiError::internal())
        }
    }
}
