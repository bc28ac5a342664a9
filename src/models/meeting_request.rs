use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::meeting_requests::{self, ContactMethod, MeetingStatus};
use crate::error::FieldErrors;
use crate::models::advisor::json_list;
use crate::models::auth::{check_email, check_phone};
use crate::models::catalog::{self, MEETING_TOPICS};

pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Body of POST /api/advisors/{id}/meeting-requests
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMeetingRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub preferred_contact_method: ContactMethod,
    #[serde(default)]
    pub topics: Vec<String>,
    pub message: Option<String>,
}

impl CreateMeetingRequest {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "Name is required");
        }
        check_email(&mut errors, "email", &self.email);

        let phone = self.phone.as_deref().filter(|p| !p.trim().is_empty());
        if self.preferred_contact_method == ContactMethod::Phone && phone.is_none() {
            errors.add("phone", "Phone is required when contact by phone is preferred");
        }
        check_phone(&mut errors, "phone", phone);

        if self.topics.is_empty() {
            errors.add("topics", "Select at least one topic");
        } else {
            catalog::check_members(&mut errors, "topics", MEETING_TOPICS, &self.topics);
        }

        if let Some(message) = &self.message {
            if message.chars().count() > MAX_MESSAGE_LENGTH {
                errors.add("message", "Message cannot exceed 2000 characters");
            }
        }
        errors.into_result()
    }
}

/// Body of PATCH /api/meeting-requests/{id}
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMeetingStatusRequest {
    pub status: MeetingStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminMeetingListQuery {
    pub advisor_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingRequestResponse {
    pub id: Uuid,
    pub advisor_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisor_name: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub preferred_contact_method: ContactMethod,
    pub topics: Vec<String>,
    pub message: Option<String>,
    pub status: MeetingStatus,
    pub created_at: DateTime<FixedOffset>,
}

impl MeetingRequestResponse {
    pub fn new(model: meeting_requests::Model, advisor_name: Option<String>) -> Self {
        Self {
            id: model.id,
            advisor_id: model.advisor_id,
            advisor_name,
            topics: json_list(&model.topics),
            name: model.name,
            email: model.email,
            phone: model.phone,
            preferred_contact_method: model.preferred_contact_method,
            message: model.message,
            status: model.status,
            created_at: model.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateMeetingRequest {
        CreateMeetingRequest {
            name: "Sam Rivera".to_string(),
            email: "sam@example.com".to_string(),
            phone: None,
            preferred_contact_method: ContactMethod::Email,
            topics: vec!["Retirement Planning".to_string()],
            message: None,
        }
    }

    #[test]
    fn test_zero_topics_is_field_error() {
        let req = CreateMeetingRequest {
            topics: vec![],
            ..request()
        };
        let errors = req.validate().unwrap_err();
        assert_eq!(errors.get("topics"), Some("Select at least one topic"));
    }

    #[test]
    fn test_phone_required_for_phone_contact() {
        let req = CreateMeetingRequest {
            preferred_contact_method: ContactMethod::Phone,
            ..request()
        };
        assert!(req.validate().unwrap_err().contains("phone"));

        let req = CreateMeetingRequest {
            preferred_contact_method: ContactMethod::Phone,
            phone: Some("512-555-0100".to_string()),
            ..request()
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_message_length_limit() {
        let req = CreateMeetingRequest {
            message: Some("x".repeat(MAX_MESSAGE_LENGTH + 1)),
            ..request()
        };
        assert!(req.validate().unwrap_err().contains("message"));
    }
}
