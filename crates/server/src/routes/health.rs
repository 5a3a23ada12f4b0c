use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use common::types::Health;

use crate::state::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health::healthy("Server is running", Utc::now().to_rfc3339()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageStatus {
    pub connected: bool,
    pub bucket: String,
    pub response_time_ms: u128,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct StorageHealth {
    pub success: bool,
    pub message: String,
    pub data: StorageStatus,
}

#[utoipa::path(
    get, path = "/health/storage", tag = "health",
    responses(
        (status = 200, description = "Object store reachable"),
        (status = 503, description = "Object store unreachable")
    )
)]
pub async fn storage_health(State(state): State<ServerState>) -> (StatusCode, Json<StorageHealth>) {
    let started = Instant::now();
    let result = state.store.health_check().await;
    let data = StorageStatus {
        connected: result.is_ok(),
        bucket: state.store.bucket().to_string(),
        response_time_ms: started.elapsed().as_millis(),
        timestamp: Utc::now().to_rfc3339(),
    };
    match result {
        Ok(()) => (
            StatusCode::OK,
            Json(StorageHealth { success: true, message: "Object store connection is healthy".into(), data }),
        ),
        Err(e) => {
            warn!(reason = %e, bucket = %data.bucket, "object store health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(StorageHealth { success: false, message: "Object store connection failed".into(), data }),
            )
        }
    }
}
