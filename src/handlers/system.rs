use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Campus API",
            "version": version,
            "description": "University administration API: class scheduling and course prerequisites",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "schedule": "/api/admin/course/:courseId/schedule[/:classTimeId] (admin)",
                "prerequisites": "/api/admin/course/:courseId/prerequisites[/:prerequisiteId] (admin)",
            }
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> Response {
    let now = chrono::Utc::now();

    match state.catalog.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "database": "unavailable"
                    }
                })),
            )
                .into_response()
        }
    }
}
