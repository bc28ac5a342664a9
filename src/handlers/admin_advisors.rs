//! Advisor moderation endpoints (admin only)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

use crate::error::{map_service_error, validation_error, ApiError};
use crate::extract::AdminUser;
use crate::models::advisor::{
    AdminAdvisorListQuery, AdminAdvisorListResponse, AdminUpdateAdvisorRequest, AdvisorResponse,
    RejectAdvisorRequest,
};
use crate::services::advisors;
use crate::AppState;

/// GET /api/admin/advisors?status=…
pub async fn list_advisors(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(query): Query<AdminAdvisorListQuery>,
) -> Result<Json<AdminAdvisorListResponse>, ApiError> {
    advisors::admin_list(&state.db, &query)
        .await
        .map(Json)
        .map_err(map_service_error)
}

/// POST /api/admin/advisors/{id}/approve
pub async fn approve_advisor(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<AdvisorResponse>, ApiError> {
    let advisor = advisors::approve(&state.db, &admin, id)
        .await
        .map_err(map_service_error)?;
    state.caches.advisors.invalidate();
    Ok(Json(advisor))
}

/// POST /api/admin/advisors/{id}/reject
pub async fn reject_advisor(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectAdvisorRequest>,
) -> Result<Json<AdvisorResponse>, ApiError> {
    let reason = payload.validate().map_err(validation_error)?;
    let advisor = advisors::reject(&state.db, &admin, id, reason)
        .await
        .map_err(map_service_error)?;
    state.caches.advisors.invalidate();
    Ok(Json(advisor))
}

/// PATCH /api/admin/advisors/{id}
pub async fn update_advisor(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdminUpdateAdvisorRequest>,
) -> Result<Json<AdvisorResponse>, ApiError> {
    info!(advisor_id = %id, admin_id = %admin.user_id, "Admin advisor edit received");
    let advisor = advisors::admin_update(&state.db, id, payload)
        .await
        .map_err(map_service_error)?;
    state.caches.advisors.invalidate();
    Ok(Json(advisor))
}

/// DELETE /api/admin/advisors/{id}
pub async fn delete_advisor(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    advisors::delete(&state.db, id)
        .await
        .map_err(map_service_error)?;
    state.caches.advisors.invalidate();
    info!(advisor_id = %id, admin_id = %admin.user_id, "Advisor deleted");
    Ok(StatusCode::NO_CONTENT)
}
