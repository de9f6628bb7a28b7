//! Health check endpoint

use crate::state::SharedState;
use axum::{extract::State, Json};
use serde::Serialize;

#[allow(missing_docs)]
#[derive(Serialize, Debug)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model: String,
}

/// GET /health - report liveness and the configured model
pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model: state.model_name.clone(),
    })
}
