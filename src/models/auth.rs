//! Account, session and profile request/response models

use chrono::{DateTime, FixedOffset};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::profiles;
use crate::error::FieldErrors;
use crate::models::catalog::{self, PROFESSIONAL_TYPES};

pub const MIN_PASSWORD_LENGTH: usize = 8;

lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$").unwrap();
    static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9 ()\-.]{7,20}$").unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email.trim())
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_REGEX.is_match(phone.trim())
}

pub fn check_email(errors: &mut FieldErrors, field: &str, email: &str) {
    if email.trim().is_empty() {
        errors.add(field, "Email is required");
    } else if !is_valid_email(email) {
        errors.add(field, "Enter a valid email address");
    }
}

pub fn check_phone(errors: &mut FieldErrors, field: &str, phone: Option<&str>) {
    if let Some(phone) = phone.filter(|p| !p.trim().is_empty()) {
        if !is_valid_phone(phone) {
            errors.add(field, "Enter a valid phone number");
        }
    }
}

fn check_professional_type(errors: &mut FieldErrors, value: Option<&str>) {
    if let Some(kind) = value {
        if !catalog::is_member(PROFESSIONAL_TYPES, kind) {
            errors.add("professional_type", format!("Unknown value: {}", kind));
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub professional_type: Option<String>,
}

impl SignUpRequest {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_email(&mut errors, "email", &self.email);
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.add("password", "Password must be at least 8 characters");
        }
        if self.full_name.trim().is_empty() {
            errors.add("full_name", "Full name is required");
        }
        check_phone(&mut errors, "phone", self.phone.as_deref());
        check_professional_type(&mut errors, self.professional_type.as_deref());
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

impl ResetPasswordRequest {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.token.trim().is_empty() {
            errors.add("token", "Reset token is required");
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.add("password", "Password must be at least 8 characters");
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub professional_type: Option<String>,
    pub is_admin: bool,
}

impl From<profiles::Model> for ProfileResponse {
    fn from(model: profiles::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            full_name: model.full_name,
            phone: model.phone,
            professional_type: model.professional_type,
            is_admin: model.is_admin,
        }
    }
}

/// Returned by sign-up and sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    /// Bearer token; only its digest is stored server-side
    pub token: String,
    pub expires_at: DateTime<FixedOffset>,
    pub user: ProfileResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgotPasswordResponse {
    pub accepted: bool,
    /// Present only when the server is configured to expose reset tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub professional_type: Option<String>,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(name) = &self.full_name {
            if name.trim().is_empty() {
                errors.add("full_name", "Full name is required");
            }
        }
        check_phone(&mut errors, "phone", self.phone.as_deref());
        check_professional_type(&mut errors, self.professional_type.as_deref());
        errors.into_result()
    }
}
