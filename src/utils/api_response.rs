use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Serialize)]
pub struct FailureResponse {
    pub success: bool,
    pub message: String,
}

pub fn failure(message: Option<&str>, status: Option<StatusCode>) -> Response {
    let resp = FailureResponse {
        success: false,
        message: message.unwrap_or("An error occurred").to_string(),
    };
    let status = status.unwrap_or(StatusCode::BAD_REQUEST);
    (status, axum::Json(resp)).into_response()
}
