//! System API endpoints.

use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, CacheStatusDto, SystemStatus};

/// Returns service status.
///
/// # Endpoint
/// `GET /api/system/status`
///
/// A failed database ping or cache health check is reported in the body,
/// never as an error response.
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SystemStatus>>, ApiError> {
    let database = state.store().ping().await.is_ok();
    let stored_flights = if database {
        state.store().count_flights().await.unwrap_or_default()
    } else {
        0
    };

    let cache = state.cache();
    let status = SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.start_time.elapsed().as_secs(),
        database,
        cache: CacheStatusDto {
            enabled: cache.is_enabled(),
            provider: cache.provider_name().to_string(),
            healthy: cache.health_check().await,
            ttl_seconds: cache.ttl().as_secs(),
        },
        fetch_mode: state.shared.fetch_mode.as_str().to_string(),
        stored_flights,
    };

    Ok(Json(ApiResponse::success(status)))
}
