//! Error types shared by services and handlers.
//!
//! Services return [`ServiceError`]; handlers turn it into the
//! `(StatusCode, Json<ErrorResponse>)` pair with [`map_service_error`].

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Error body returned by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Field name -> message, only for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.into(),
            code: Some(code.to_string()),
            fields: None,
        }
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Per-field validation messages; the first message recorded for a field wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error("Validation failed")]
    Validation(FieldErrors),
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("Cannot move from {from} to {to}")]
    InvalidTransition { from: String, to: String },
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Too many requests, try again in a minute")]
    RateLimited,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<FieldErrors> for ServiceError {
    fn from(errors: FieldErrors) -> Self {
        ServiceError::Validation(errors)
    }
}

impl ServiceError {
    /// Recover an owned error from one shared through a coalesced cache load.
    pub fn from_shared(shared: Arc<ServiceError>) -> Self {
        match Arc::try_unwrap(shared) {
            Ok(err) => err,
            Err(shared) => match &*shared {
                ServiceError::Validation(errors) => ServiceError::Validation(errors.clone()),
                ServiceError::NotFound(what) => ServiceError::NotFound(what.clone()),
                other => ServiceError::Internal(other.to_string()),
            },
        }
    }
}

pub fn map_service_error(err: ServiceError) -> ApiError {
    let (status, code) = match &err {
        ServiceError::Database(e) => {
            error!(error = %e, "Database call failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR")
        }
        ServiceError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
        ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        ServiceError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
        ServiceError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
        ServiceError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
        ServiceError::InvalidTransition { .. } => (StatusCode::CONFLICT, "INVALID_TRANSITION"),
        ServiceError::Storage(e) => {
            error!(error = %e, "Object storage call failed");
            (StatusCode::BAD_GATEWAY, "STORAGE_ERROR")
        }
        ServiceError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMIT_EXCEEDED"),
        ServiceError::Internal(e) => {
            error!(error = %e, "Internal error");
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        }
    };

    let message = err.to_string();
    let fields = match err {
        ServiceError::Validation(errors) => Some(errors.into_inner()),
        _ => None,
    };

    (
        status,
        Json(ErrorResponse {
            error: message,
            code: Some(code.to_string()),
            fields,
        }),
    )
}

/// Shorthand for handler-level validation failures.
pub fn validation_error(errors: FieldErrors) -> ApiError {
    map_service_error(ServiceError::Validation(errors))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_message_per_field_wins() {
        let mut errors = FieldErrors::new();
        errors.add("email", "Email is required");
        errors.add("email", "Enter a valid email address");
        assert_eq!(errors.get("email"), Some("Email is required"));
        assert!(errors.into_result().is_err());
        assert!(FieldErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_validation_maps_to_422_with_fields() {
        let mut errors = FieldErrors::new();
        errors.add("personal_bio", "Bio must be at least 10 characters");
        let (status, Json(body)) = map_service_error(ServiceError::Validation(errors));

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.code.as_deref(), Some("VALIDATION_ERROR"));
        let fields = body.fields.unwrap();
        assert_eq!(
            fields.get("personal_bio").map(String::as_str),
            Some("Bio must be at least 10 characters")
        );
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (ServiceError::NotFound("Advisor".into()), StatusCode::NOT_FOUND),
            (ServiceError::Conflict("taken".into()), StatusCode::CONFLICT),
            (ServiceError::Forbidden("no".into()), StatusCode::FORBIDDEN),
            (ServiceError::Unauthorized("no".into()), StatusCode::UNAUTHORIZED),
            (ServiceError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (
                ServiceError::InvalidTransition {
                    from: "approved".into(),
                    to: "rejected".into(),
                },
                StatusCode::CONFLICT,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(map_service_error(err).0, expected);
        }
    }

    #[test]
    fn test_not_found_message() {
        let (_, Json(body)) = map_service_error(ServiceError::NotFound("Advisor".into()));
        assert_eq!(body.error, "Advisor not found");
        assert!(body.fields.is_none());
    }
}
