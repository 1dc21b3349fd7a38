//! Liveness endpoint.

use axum::Json;

use crate::models::HealthResponse;

/// `GET /health`: always `{"status": "okay"}` while the process serves.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "okay".to_string(),
    })
}
