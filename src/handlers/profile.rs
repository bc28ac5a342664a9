use axum::{extract::State, Json};

use crate::error::{map_service_error, ApiError};
use crate::extract::CurrentUser;
use crate::models::auth::{ProfileResponse, UpdateProfileRequest};
use crate::AppState;

/// GET /api/profile
pub async fn get_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    state
        .auth
        .profile(&state.db, user.user_id)
        .await
        .map(Json)
        .map_err(map_service_error)
}

/// PATCH /api/profile
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    state
        .auth
        .update_profile(&state.db, user.user_id, payload)
        .await
        .map(Json)
        .map_err(map_service_error)
}
