use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::error::AppResult;
use crate::state::AppState;

/// Health check endpoint
pub async fn health_handler(State(state): State<AppState>) -> AppResult<Json<Value>> {
    info!("Health check requested");

    let extractor_ready = state.extractor.is_available();
    let status = if extractor_ready { "healthy" } else { "degraded" };

    let response = json!({
        "status": status,
        "timestamp": chrono::Utc::now().timestamp(),
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "text_extractor": extractor_ready
        },
        "limits": {
            "max_file_size_mb": state.config.max_file_size_mb
        },
        "uptime_seconds": state.started_at.elapsed().as_secs()
    });

    info!(status = status, extractor_ready = extractor_ready, "Health check completed");

    Ok(Json(response))
}

/// Readiness check endpoint
pub async fn ready_handler(State(state): State<AppState>) -> Result<StatusCode, StatusCode> {
    if state.extractor.is_available() {
        info!("Readiness check passed");
        Ok(StatusCode::OK)
    } else {
        info!("Readiness check failed - upload directory unavailable");
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}
