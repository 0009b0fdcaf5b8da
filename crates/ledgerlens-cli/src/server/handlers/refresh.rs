//! Refresh handler.

use axum::{Json, extract::State};
use ledgerlens::RefreshReport;
use tracing::info;

use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Drop the cached dataset and reload the source file from disk.
pub async fn refresh(State(state): State<AppState>) -> Result<Json<RefreshReport>, ApiError> {
    let mut session = state.session.write().await;
    let report = session.refresh()?;
    info!(changed = report.changed, filters_kept = report.filters_kept, "refresh requested");
    Ok(Json(report))
}
