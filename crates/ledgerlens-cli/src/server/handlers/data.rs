//! Data preview handler.

use axum::{Json, extract::State};
use ledgerlens::Value;
use serde::Serialize;

use crate::server::state::AppState;

/// Response for the data preview endpoint.
#[derive(Serialize)]
pub struct DataPreviewResponse {
    /// Column headers.
    pub headers: Vec<String>,
    /// Data rows (first N rows).
    pub rows: Vec<Vec<Value>>,
    /// Total row count of the loaded dataset.
    pub total_rows: usize,
    /// Whether the data was truncated.
    pub truncated: bool,
}

/// Get a preview of the loaded, unfiltered data.
pub async fn get_data_preview(State(state): State<AppState>) -> Json<DataPreviewResponse> {
    let session = state.session.read().await;
    let dataset = session.dataset();
    let limit = session.config().preview_rows;

    Json(DataPreviewResponse {
        headers: dataset.headers().to_vec(),
        rows: dataset.rows().iter().take(limit).cloned().collect(),
        total_rows: dataset.row_count(),
        truncated: dataset.row_count() > limit,
    })
}
