use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::app::services::AppServices;

/// Health check: probes the primary store and the auxiliary cache, failing
/// closed (503) when either is unreachable.
pub async fn health(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let database = services.store_health.ping().await;
    let cache = services.cache.ping();

    let healthy = database.is_ok() && cache.is_ok();
    let body = serde_json::json!({
        "status": if healthy { "healthy" } else { "unhealthy" },
        "checks": {
            "database": if database.is_ok() { "up" } else { "down" },
            "cache": if cache.is_ok() { "up" } else { "down" },
        },
    });

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body)).into_response()
}
