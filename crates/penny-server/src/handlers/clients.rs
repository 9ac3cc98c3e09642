//! Client handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Local;
use serde::Deserialize;

use crate::{AppError, AppState};
use penny_core::spending::DEFAULT_LOOKBACK_MONTHS;
use penny_core::{Client, SpendingSummary};

/// Longest lookback window accepted by the summary endpoint
const MAX_LOOKBACK_MONTHS: u32 = 120;

/// Query parameters for a spending summary
#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    /// Lookback window in calendar months (default 3)
    #[serde(default = "default_months")]
    pub months: u32,
}

fn default_months() -> u32 {
    DEFAULT_LOOKBACK_MONTHS
}

/// GET /api/clients - List all clients
pub async fn list_clients(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Client>>, AppError> {
    let clients = state.db.list_clients()?;
    Ok(Json(clients))
}

/// GET /api/clients/:id/summary - Spending totals for the lookback window
pub async fn get_client_summary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(params): Query<SummaryQuery>,
) -> Result<Json<SpendingSummary>, AppError> {
    if params.months == 0 || params.months > MAX_LOOKBACK_MONTHS {
        return Err(AppError::bad_request(&format!(
            "months must be between 1 and {}",
            MAX_LOOKBACK_MONTHS
        )));
    }

    state.db.require_client(id)?;
    let summary = state
        .db
        .spending_summary(id, params.months, Local::now().date_naive())?;

    Ok(Json(summary))
}
