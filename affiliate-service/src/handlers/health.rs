//! Health and metrics endpoints.

use axum::extract::{Json, State};
use axum::response::IntoResponse;

use crate::services::metrics::get_metrics;
use crate::AppState;
use platform_core::error::AppError;

/// Liveness check with a database ping.
///
/// GET /health
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.db.health_check().await.map_err(|e| {
        tracing::error!(error = %e, "Database health check failed");
        e
    })?;

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": state.config.service_name,
        "version": state.config.service_version,
        "environment": format!("{:?}", state.config.environment),
        "checks": {
            "database": "up"
        }
    })))
}

/// Prometheus metrics in text exposition format.
///
/// GET /metrics
pub async fn metrics() -> impl IntoResponse {
    get_metrics()
}
