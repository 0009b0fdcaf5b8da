//! Profile handler.

use axum::{Json, extract::State};
use ledgerlens::{SourceMetadata, TableProfile};
use serde::Serialize;

use crate::server::state::AppState;

#[derive(Serialize)]
pub struct ProfileResponse {
    pub source: SourceMetadata,
    pub profile: TableProfile,
}

/// Column profile of the loaded dataset.
pub async fn get_profile(State(state): State<AppState>) -> Json<ProfileResponse> {
    let session = state.session.read().await;
    Json(ProfileResponse {
        source: session.source().clone(),
        profile: session.profile().clone(),
    })
}
