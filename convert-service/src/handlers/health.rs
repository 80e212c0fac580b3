use crate::dtos::HealthResponse;
use axum::{response::IntoResponse, Json};

/// Liveness only; storage and the converter are not probed.
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse::running())
}
