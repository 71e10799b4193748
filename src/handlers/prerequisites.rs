use axum::{
    extract::{Path, State},
    Extension,
};
use serde_json::{json, Value};

use super::parse_id;
use crate::auth::Principal;
use crate::middleware::{ApiResponse, ApiResult, ValidJson};
use crate::services::{self, AddPrerequisiteRequest};
use crate::state::AppState;

/// POST /api/admin/course/:course_id/prerequisites
pub async fn prerequisite_post(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(course_id): Path<String>,
    ValidJson(body): ValidJson<AddPrerequisiteRequest>,
) -> ApiResult<Value> {
    let course_id = parse_id("courseId", &course_id)?;
    let prerequisite_id = body.validate()?;

    let mut catalog = state.catalog.begin().await?;
    let prerequisite = services::add_prerequisite(catalog.as_mut(), &principal, course_id, prerequisite_id).await?;
    catalog.commit().await?;

    Ok(ApiResponse::created(json!({ "prerequisite": prerequisite })))
}

/// DELETE /api/admin/course/:course_id/prerequisites/:prerequisite_id
pub async fn prerequisite_delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((course_id, prerequisite_id)): Path<(String, String)>,
) -> ApiResult<Value> {
    let course_id = parse_id("courseId", &course_id)?;
    let prerequisite_id = parse_id("prerequisiteId", &prerequisite_id)?;

    let mut catalog = state.catalog.begin().await?;
    let removed = services::remove_prerequisite(catalog.as_mut(), &principal, course_id, prerequisite_id).await?;
    catalog.commit().await?;

    Ok(ApiResponse::success(json!({
        "message": "Prerequisite removed successfully.",
        "prerequisite": removed
    })))
}
