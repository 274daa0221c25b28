mod health;

pub use health::HealthResponse;

use axum::{http::StatusCode, response::Response, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::utils::api_response;

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> Response {
    api_response::failure(Some("Route not found"), Some(StatusCode::NOT_FOUND))
}
