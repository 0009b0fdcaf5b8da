//! Filter handler.

use axum::{Json, extract::State};
use ledgerlens::{FilterSet, FilterStats, ReconciliationSummary, Value};
use serde::Serialize;
use tracing::debug;

use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Response for a filter application.
#[derive(Serialize)]
pub struct FilterResponse {
    /// `matched` or `no_rows_matched`.
    pub status: &'static str,
    pub stats: FilterStats,
    pub matched_percentage: f64,
    pub headers: Vec<String>,
    /// First rows of the filtered view.
    pub rows: Vec<Vec<Value>>,
    pub truncated: bool,
    pub reconciliation: ReconciliationSummary,
}

/// Apply a filter set, replacing the session's previous result.
pub async fn apply_filters(
    State(state): State<AppState>,
    Json(filters): Json<FilterSet>,
) -> Result<Json<FilterResponse>, ApiError> {
    let mut session = state.session.write().await;
    let limit = session.config().result_rows;
    let headers = session.dataset().headers().to_vec();

    let report = session.apply(filters)?;
    debug!(
        status = report.outcome.status(),
        matched = report.stats().matched_rows,
        "filter request"
    );
    let rows: Vec<Vec<Value>> = report
        .outcome
        .dataset()
        .map(|ds| ds.rows().iter().take(limit).cloned().collect())
        .unwrap_or_default();

    Ok(Json(FilterResponse {
        status: report.outcome.status(),
        stats: *report.stats(),
        matched_percentage: report.stats().matched_percentage(),
        headers,
        truncated: report.stats().matched_rows > rows.len(),
        rows,
        reconciliation: report.reconciliation.clone(),
    }))
}
