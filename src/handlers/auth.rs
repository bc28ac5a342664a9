//! Sign-up, sign-in and password reset endpoints

use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

use crate::error::{map_service_error, ApiError};
use crate::extract::{BearerToken, CurrentUser};
use crate::models::auth::{
    ForgotPasswordRequest, ForgotPasswordResponse, ProfileResponse, ResetPasswordRequest,
    SessionResponse, SignInRequest, SignUpRequest, SuccessResponse,
};
use crate::AppState;

/// POST /api/auth/sign-up
pub async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    info!(email = %payload.email, "Sign-up request received");
    let session = state
        .auth
        .sign_up(&state.db, payload)
        .await
        .map_err(map_service_error)?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// POST /api/auth/sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<SignInRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = state
        .auth
        .sign_in(&state.db, payload)
        .await
        .map_err(map_service_error)?;
    Ok(Json(session))
}

/// POST /api/auth/sign-out
pub async fn sign_out(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<SuccessResponse>, ApiError> {
    state
        .auth
        .sign_out(&state.db, &token)
        .await
        .map_err(map_service_error)?;
    Ok(Json(SuccessResponse { success: true }))
}

/// GET /api/auth/session
pub async fn session(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = state
        .auth
        .profile(&state.db, user.user_id)
        .await
        .map_err(map_service_error)?;
    Ok(Json(profile))
}

/// POST /api/auth/forgot-password
///
/// Always `202`, whether or not the address has an account.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<(StatusCode, Json<ForgotPasswordResponse>), ApiError> {
    let response = state
        .auth
        .forgot_password(&state.db, &payload.email, state.config.expose_reset_tokens)
        .await
        .map_err(map_service_error)?;
    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// POST /api/auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state
        .auth
        .reset_password(&state.db, payload)
        .await
        .map_err(map_service_error)?;
    Ok(Json(SuccessResponse { success: true }))
}
