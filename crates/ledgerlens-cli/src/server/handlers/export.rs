//! Export handler.

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use ledgerlens::ExportFormat;
use serde::Deserialize;

use crate::server::error::ApiError;
use crate::server::state::AppState;

#[derive(Deserialize)]
pub struct ExportQuery {
    /// csv, tsv, json or xlsx (default csv).
    pub format: Option<String>,
}

/// Download the current view with reconciliation flags.
pub async fn export_data(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let format = match query.format.as_deref() {
        Some(f) => f
            .parse::<ExportFormat>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => ExportFormat::default(),
    };

    let session = state.session.read().await;
    let body = session.export(format)?;

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"filtered_data.{}\"", format.extension()),
            ),
        ],
        body,
    ))
}
