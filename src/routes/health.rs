use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub env: String,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    debug!("Health check endpoint accessed");
    Json(HealthResponse {
        status: "ok".to_string(),
        env: state.settings.env.clone(),
    })
}
