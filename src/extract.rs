//! Request extractors for the bearer-token session

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};

use crate::error::{map_service_error, ApiError, ServiceError};
use crate::services::auth::SessionContext;
use crate::services::rate_limit::client_key;
use crate::AppState;

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

fn unauthorized() -> ApiError {
    map_service_error(ServiceError::Unauthorized("Sign in required".to_string()))
}

/// Raw bearer token, for sign-out
pub struct BearerToken(pub String);

impl FromRequestParts<AppState> for BearerToken {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self, Self::Rejection> {
        bearer_token(parts).map(BearerToken).ok_or_else(unauthorized)
    }
}

/// Signed-in caller; `401` otherwise
pub struct CurrentUser(pub SessionContext);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(unauthorized)?;
        state
            .auth
            .resolve(&state.db, &token)
            .await
            .map(CurrentUser)
            .map_err(map_service_error)
    }
}

/// Caller if signed in. A missing or stale token reads as anonymous.
pub struct MaybeUser(pub Option<SessionContext>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            return Ok(MaybeUser(None));
        };
        match state.auth.resolve(&state.db, &token).await {
            Ok(ctx) => Ok(MaybeUser(Some(ctx))),
            Err(ServiceError::Unauthorized(_)) => Ok(MaybeUser(None)),
            Err(e) => Err(map_service_error(e)),
        }
    }
}

/// Signed-in admin; `401` without a session, `403` for other users
pub struct AdminUser(pub SessionContext);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(ctx) = CurrentUser::from_request_parts(parts, state).await?;
        if !ctx.is_admin {
            tracing::warn!(user_id = %ctx.user_id, path = %parts.uri.path(), "Admin route refused");
            return Err(map_service_error(ServiceError::Forbidden(
                "Admin access required".to_string(),
            )));
        }
        Ok(AdminUser(ctx))
    }
}

/// Rate-limit identity of the caller
pub struct ClientKey(pub String);

impl FromRequestParts<AppState> for ClientKey {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(ClientKey(client_key(
            &parts.headers,
            peer,
            state.config.trust_forwarded_headers,
        )))
    }
}
