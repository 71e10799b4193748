use axum::{
    extract::{Path, State},
    Extension,
};
use serde_json::{json, Value};

use super::parse_id;
use crate::auth::Principal;
use crate::middleware::{ApiResponse, ApiResult, ValidJson};
use crate::services::{self, CreateClassSessionRequest};
use crate::state::AppState;

/// POST /api/admin/course/:course_id/schedule
pub async fn class_session_post(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(course_id): Path<String>,
    ValidJson(body): ValidJson<CreateClassSessionRequest>,
) -> ApiResult<Value> {
    let course_id = parse_id("courseId", &course_id)?;
    let input = body.validate()?;

    let mut catalog = state.catalog.begin().await?;
    let class_time = services::add_class_session(catalog.as_mut(), &principal, course_id, input).await?;
    catalog.commit().await?;

    Ok(ApiResponse::created(json!({ "classTime": class_time })))
}

/// DELETE /api/admin/course/:course_id/schedule/:class_time_id
pub async fn class_session_delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((course_id, class_time_id)): Path<(String, String)>,
) -> ApiResult<Value> {
    let course_id = parse_id("courseId", &course_id)?;
    let class_time_id = parse_id("classTimeId", &class_time_id)?;

    let mut catalog = state.catalog.begin().await?;
    let removed = services::remove_class_session(catalog.as_mut(), &principal, course_id, class_time_id).await?;
    catalog.commit().await?;

    Ok(ApiResponse::success(json!({
        "message": "Class time deleted successfully.",
        "classTime": removed
    })))
}
