use axum::Json;
use serde::Serialize;

use crate::consts::VERSION;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "reviewtag".to_string(),
        version: VERSION.to_string(),
    })
}
