//! Advisor registration, self-service, admin and listing models

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::advisors::{self, AdvisorStatus};
use crate::error::FieldErrors;
use crate::models::auth::{check_email, check_phone};
use crate::models::catalog::{self, CLIENT_TYPES, COMPENSATION_TYPES, DESIGNATIONS, LICENSES, SERVICES, US_STATES};
use crate::models::listing::{non_blank, split_multi, AssetBucket, Pagination};

pub const MIN_BIO_LENGTH: usize = 10;
pub const MAX_YEARS_OF_EXPERIENCE: i32 = 80;

/// Body of POST /api/advisors/register
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterAdvisorRequest {
    pub name: String,
    pub firm_name: String,
    pub firm_id: Option<Uuid>,
    pub position: Option<String>,
    pub personal_bio: String,
    pub firm_bio: String,
    pub email: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub years_of_experience: Option<i32>,
    pub minimum_investment: Option<String>,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub designations: Vec<String>,
    #[serde(default)]
    pub licenses: Vec<String>,
    #[serde(default)]
    pub compensation_types: Vec<String>,
    #[serde(default)]
    pub client_types: Vec<String>,
    #[serde(default)]
    pub registered_states: Vec<String>,
    #[serde(default)]
    pub terms_accepted: bool,
    /// Keep the record as a draft instead of submitting it for approval
    #[serde(default)]
    pub save_as_draft: bool,
}

impl RegisterAdvisorRequest {
    /// Every rule is checked so the caller gets all field errors at once.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.name.trim().is_empty() {
            errors.add("name", "Name is required");
        }
        if self.firm_name.trim().is_empty() {
            errors.add("firm_name", "Firm name is required");
        }
        check_bio(&mut errors, "personal_bio", &self.personal_bio);
        check_bio(&mut errors, "firm_bio", &self.firm_bio);
        check_email(&mut errors, "email", &self.email);
        check_phone(&mut errors, "phone", self.phone.as_deref());
        check_website(&mut errors, self.website.as_deref());
        catalog::check_state(&mut errors, "state", self.state.as_deref());

        match self.years_of_experience {
            None => errors.add("years_of_experience", "Years of experience is required"),
            Some(years) => check_years(&mut errors, years),
        }

        if self.services.is_empty() {
            errors.add("services", "Select at least one service");
        }
        if self.client_types.is_empty() {
            errors.add("client_types", "Select at least one client type");
        }
        check_categories(
            &mut errors,
            &self.services,
            &self.designations,
            &self.licenses,
            &self.compensation_types,
            &self.client_types,
            &self.registered_states,
        );

        if !self.terms_accepted {
            errors.add("terms_accepted", "You must accept the terms and conditions");
        }

        errors.into_result()
    }
}

/// Partial update of an advisor profile (owner or admin)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAdvisorRequest {
    pub name: Option<String>,
    pub firm_name: Option<String>,
    pub firm_id: Option<Uuid>,
    pub position: Option<String>,
    pub personal_bio: Option<String>,
    pub firm_bio: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub years_of_experience: Option<i32>,
    pub minimum_investment: Option<String>,
    pub services: Option<Vec<String>>,
    pub designations: Option<Vec<String>>,
    pub licenses: Option<Vec<String>>,
    pub compensation_types: Option<Vec<String>>,
    pub client_types: Option<Vec<String>>,
    pub registered_states: Option<Vec<String>>,
}

impl UpdateAdvisorRequest {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if matches!(&self.name, Some(n) if n.trim().is_empty()) {
            errors.add("name", "Name is required");
        }
        if matches!(&self.firm_name, Some(n) if n.trim().is_empty()) {
            errors.add("firm_name", "Firm name is required");
        }
        if let Some(bio) = &self.personal_bio {
            check_bio(&mut errors, "personal_bio", bio);
        }
        if let Some(bio) = &self.firm_bio {
            check_bio(&mut errors, "firm_bio", bio);
        }
        if let Some(email) = &self.email {
            check_email(&mut errors, "email", email);
        }
        check_phone(&mut errors, "phone", self.phone.as_deref());
        check_website(&mut errors, self.website.as_deref());
        catalog::check_state(&mut errors, "state", self.state.as_deref());
        if let Some(years) = self.years_of_experience {
            check_years(&mut errors, years);
        }
        if matches!(&self.services, Some(s) if s.is_empty()) {
            errors.add("services", "Select at least one service");
        }
        if matches!(&self.client_types, Some(c) if c.is_empty()) {
            errors.add("client_types", "Select at least one client type");
        }
        check_categories(
            &mut errors,
            self.services.as_deref().unwrap_or_default(),
            self.designations.as_deref().unwrap_or_default(),
            self.licenses.as_deref().unwrap_or_default(),
            self.compensation_types.as_deref().unwrap_or_default(),
            self.client_types.as_deref().unwrap_or_default(),
            self.registered_states.as_deref().unwrap_or_default(),
        );

        errors.into_result()
    }
}

/// Admin edit: any profile field plus the badge flags
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminUpdateAdvisorRequest {
    #[serde(flatten)]
    pub profile: UpdateAdvisorRequest,
    pub verified: Option<bool>,
    pub premium: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RejectAdvisorRequest {
    #[serde(default)]
    pub reason: String,
}

impl RejectAdvisorRequest {
    /// A rejection needs a reason the advisor can act on.
    pub fn validate(&self) -> Result<String, FieldErrors> {
        let reason = self.reason.trim();
        if reason.is_empty() {
            let mut errors = FieldErrors::new();
            errors.add("reason", "A rejection reason is required");
            return Err(errors);
        }
        Ok(reason.to_string())
    }
}

fn check_bio(errors: &mut FieldErrors, field: &str, bio: &str) {
    if bio.trim().chars().count() < MIN_BIO_LENGTH {
        errors.add(field, "Bio must be at least 10 characters");
    }
}

fn check_years(errors: &mut FieldErrors, years: i32) {
    if !(0..=MAX_YEARS_OF_EXPERIENCE).contains(&years) {
        errors.add("years_of_experience", "Years of experience must be between 0 and 80");
    }
}

fn check_website(errors: &mut FieldErrors, website: Option<&str>) {
    if let Some(url) = website.filter(|w| !w.trim().is_empty()) {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.add("website", "Website must start with http:// or https://");
        }
    }
}

fn check_categories(
    errors: &mut FieldErrors,
    services: &[String],
    designations: &[String],
    licenses: &[String],
    compensation_types: &[String],
    client_types: &[String],
    registered_states: &[String],
) {
    catalog::check_members(errors, "services", SERVICES, services);
    catalog::check_members(errors, "designations", DESIGNATIONS, designations);
    catalog::check_members(errors, "licenses", LICENSES, licenses);
    catalog::check_members(errors, "compensation_types", COMPENSATION_TYPES, compensation_types);
    catalog::check_members(errors, "client_types", CLIENT_TYPES, client_types);
    catalog::check_members(errors, "registered_states", US_STATES, registered_states);
}

/// Decode a JSONB string array, tolerating malformed rows.
pub fn json_list(value: &serde_json::Value) -> Vec<String> {
    serde_json::from_value(value.clone()).unwrap_or_default()
}

/// Query parameters for GET /api/advisors
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdvisorListQuery {
    pub search: Option<String>,
    pub state: Option<String>,
    pub client_type: Option<String>,
    /// Comma-separated services; a match must offer every one
    pub specialty: Option<String>,
    pub min_assets: Option<AssetBucket>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// Normalized advisor filters; also the listing cache key
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct AdvisorFilters {
    pub search: Option<String>,
    pub state: Option<String>,
    pub client_type: Option<String>,
    pub specialties: Vec<String>,
    pub min_assets: Option<AssetBucket>,
    pub pagination: Pagination,
}

impl AdvisorListQuery {
    pub fn normalize(&self) -> Result<AdvisorFilters, FieldErrors> {
        let mut errors = FieldErrors::new();
        let pagination = Pagination::from_query(self.page, self.per_page, &mut errors);

        let state = non_blank(self.state.as_deref());
        catalog::check_state(&mut errors, "state", state.as_deref());

        let client_type = non_blank(self.client_type.as_deref());
        if let Some(ct) = &client_type {
            if !catalog::is_member(CLIENT_TYPES, ct) {
                errors.add("client_type", format!("Unknown value: {}", ct));
            }
        }

        let specialties = split_multi(self.specialty.as_deref());
        catalog::check_members(&mut errors, "specialty", SERVICES, &specialties);

        errors.into_result()?;

        Ok(AdvisorFilters {
            search: non_blank(self.search.as_deref()).map(|s| s.to_lowercase()),
            state,
            client_type,
            specialties,
            min_assets: self.min_assets,
            pagination,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirmLink {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

/// Directory card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorSummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub firm_name: String,
    pub position: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub headshot_url: Option<String>,
    pub years_of_experience: i32,
    pub services: Vec<String>,
    pub designations: Vec<String>,
    pub minimum_investment: Option<String>,
    /// Display label of the minimum-investment bucket
    pub minimum_investment_bucket: String,
    pub verified: bool,
    pub premium: bool,
}

impl From<&advisors::Model> for AdvisorSummary {
    fn from(model: &advisors::Model) -> Self {
        Self {
            id: model.id,
            name: model.name.clone(),
            slug: model.slug.clone(),
            firm_name: model.firm_name.clone(),
            position: model.position.clone(),
            city: model.city.clone(),
            state: model.state.clone(),
            headshot_url: model.headshot_url.clone(),
            years_of_experience: model.years_of_experience,
            services: json_list(&model.services),
            designations: json_list(&model.designations),
            minimum_investment: model.minimum_investment.clone(),
            minimum_investment_bucket: AssetBucket::for_amount(model.minimum_investment_amount)
                .label()
                .to_string(),
            verified: model.verified,
            premium: model.premium,
        }
    }
}

/// Full advisor record, used for detail pages, self-service and admin views
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorResponse {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub firm_name: String,
    pub firm: Option<FirmLink>,
    pub position: Option<String>,
    pub personal_bio: String,
    pub firm_bio: String,
    pub email: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub years_of_experience: i32,
    pub minimum_investment: Option<String>,
    pub minimum_investment_bucket: String,
    pub services: Vec<String>,
    pub designations: Vec<String>,
    pub licenses: Vec<String>,
    pub compensation_types: Vec<String>,
    pub client_types: Vec<String>,
    pub registered_states: Vec<String>,
    pub headshot_url: Option<String>,
    pub status: AdvisorStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub verified: bool,
    pub premium: bool,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl AdvisorResponse {
    pub fn from_model(model: advisors::Model, firm: Option<FirmLink>) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            minimum_investment_bucket: AssetBucket::for_amount(model.minimum_investment_amount)
                .label()
                .to_string(),
            services: json_list(&model.services),
            designations: json_list(&model.designations),
            licenses: json_list(&model.licenses),
            compensation_types: json_list(&model.compensation_types),
            client_types: json_list(&model.client_types),
            registered_states: json_list(&model.registered_states),
            name: model.name,
            slug: model.slug,
            firm_name: model.firm_name,
            firm,
            position: model.position,
            personal_bio: model.personal_bio,
            firm_bio: model.firm_bio,
            email: model.email,
            phone: model.phone,
            website: model.website,
            city: model.city,
            state: model.state,
            years_of_experience: model.years_of_experience,
            minimum_investment: model.minimum_investment,
            headshot_url: model.headshot_url,
            status: model.status,
            approved_by: model.approved_by,
            approved_at: model.approved_at,
            rejection_reason: model.rejection_reason,
            verified: model.verified,
            premium: model.premium,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }

    /// Public detail pages hide moderation metadata.
    pub fn without_moderation(mut self) -> Self {
        self.approved_by = None;
        self.rejection_reason = None;
        self
    }
}

/// GET /api/advisors/me
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnAdvisorResponse {
    pub advisor: AdvisorResponse,
    /// False once approved; the profile form is read-only from then on
    pub editable: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminAdvisorListQuery {
    pub status: Option<AdvisorStatus>,
    pub search: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusCounts {
    pub draft: u64,
    pub pending_approval: u64,
    pub approved: u64,
    pub rejected: u64,
}

/// GET /api/admin/advisors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminAdvisorListResponse {
    pub advisors: crate::models::listing::Page<AdvisorResponse>,
    pub counts: StatusCounts,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_registration() -> RegisterAdvisorRequest {
        RegisterAdvisorRequest {
            name: "Jane Doe".to_string(),
            firm_name: "Lone Star Wealth".to_string(),
            personal_bio: "Twenty years helping Texas families retire well.".to_string(),
            firm_bio: "Independent fee-only practice in Austin.".to_string(),
            email: "jane@lonestar.example".to_string(),
            state: Some("Texas".to_string()),
            years_of_experience: Some(20),
            minimum_investment: Some("$250k".to_string()),
            services: vec!["Retirement Planning".to_string()],
            client_types: vec!["Retirees".to_string()],
            terms_accepted: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_registration() {
        assert!(valid_registration().validate().is_ok());
    }

    #[test]
    fn test_short_bio_rejected() {
        let mut req = valid_registration();
        req.personal_bio = "Too short".to_string();
        let errors = req.validate().unwrap_err();
        assert_eq!(errors.get("personal_bio"), Some("Bio must be at least 10 characters"));

        let mut req = valid_registration();
        req.firm_bio = "   tiny   ".to_string();
        assert!(req.validate().unwrap_err().contains("firm_bio"));
    }

    #[test]
    fn test_missing_required_selections() {
        let mut req = valid_registration();
        req.services.clear();
        req.client_types.clear();
        req.terms_accepted = false;
        req.years_of_experience = None;
        let errors = req.validate().unwrap_err();
        for field in ["services", "client_types", "terms_accepted", "years_of_experience"] {
            assert!(errors.contains(field), "missing error for {}", field);
        }
    }

    #[test]
    fn test_unknown_enumeration_values_rejected() {
        let mut req = valid_registration();
        req.designations = vec!["Wizard".to_string()];
        req.registered_states = vec!["Texas".to_string(), "Narnia".to_string()];
        let errors = req.validate().unwrap_err();
        assert!(errors.contains("designations"));
        assert!(errors.contains("registered_states"));
    }

    #[test]
    fn test_update_validates_only_present_fields() {
        assert!(UpdateAdvisorRequest::default().validate().is_ok());

        let req = UpdateAdvisorRequest {
            personal_bio: Some("short".to_string()),
            services: Some(vec![]),
            ..Default::default()
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.contains("personal_bio"));
        assert!(errors.contains("services"));
    }

    #[test]
    fn test_reject_requires_reason() {
        let req = RejectAdvisorRequest {
            reason: "   ".to_string(),
        };
        assert!(req.validate().unwrap_err().contains("reason"));

        let req = RejectAdvisorRequest {
            reason: "  Missing ADV disclosure  ".to_string(),
        };
        assert_eq!(req.validate().unwrap(), "Missing ADV disclosure");
    }

    #[test]
    fn test_list_query_normalizes() {
        let query = AdvisorListQuery {
            search: Some("  Jane ".to_string()),
            state: Some("Texas".to_string()),
            specialty: Some("Retirement Planning,Tax Planning".to_string()),
            ..Default::default()
        };
        let filters = query.normalize().unwrap();
        assert_eq!(filters.search.as_deref(), Some("jane"));
        assert_eq!(filters.specialties.len(), 2);
        assert_eq!(filters.pagination, Pagination::default());
    }

    #[test]
    fn test_cleared_query_is_unfiltered_first_page() {
        let filters = AdvisorListQuery::default().normalize().unwrap();
        assert_eq!(filters, AdvisorFilters::default());
        assert_eq!(filters.pagination.page, 1);
    }

    #[test]
    fn test_list_query_rejects_unknown_filters() {
        let query = AdvisorListQuery {
            state: Some("Gondor".to_string()),
            specialty: Some("Alchemy".to_string()),
            ..Default::default()
        };
        let errors = query.normalize().unwrap_err();
        assert!(errors.contains("state"));
        assert!(errors.contains("specialty"));
    }
}
