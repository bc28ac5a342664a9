//! Investment and accounting firm models

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{
    accounting_firms, firm_features, firm_leaders, firm_registrations, investment_firms,
};
use crate::error::FieldErrors;
use crate::models::advisor::json_list;
use crate::models::catalog::{self, ACCOUNTING_SERVICES, ASSET_CLASSES, CLIENT_TYPES};
use crate::models::listing::{non_blank, split_multi, AssetBucket, FeeBucket, Pagination};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaderInput {
    pub name: String,
    pub title: String,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegistrationInput {
    pub regulator: String,
    pub registration_number: Option<String>,
}

/// Child collections accepted by firm create/update. On update, a present
/// collection replaces the stored one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FirmChildrenInput {
    pub leaders: Option<Vec<LeaderInput>>,
    pub features: Option<Vec<String>>,
    pub registrations: Option<Vec<RegistrationInput>>,
    pub similar_firm_ids: Option<Vec<Uuid>>,
}

impl FirmChildrenInput {
    fn check(&self, errors: &mut FieldErrors) {
        if let Some(leaders) = &self.leaders {
            if leaders
                .iter()
                .any(|l| l.name.trim().is_empty() || l.title.trim().is_empty())
            {
                errors.add("leaders", "Every leader needs a name and a title");
            }
        }
        if let Some(features) = &self.features {
            if features.iter().any(|f| f.trim().is_empty()) {
                errors.add("features", "Features cannot be blank");
            }
        }
        if let Some(registrations) = &self.registrations {
            if registrations.iter().any(|r| r.regulator.trim().is_empty()) {
                errors.add("registrations", "Every registration needs a regulator");
            }
        }
    }
}

/// Fields common to both firm kinds
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FirmCommonInput {
    pub name: Option<String>,
    pub headquarters: Option<String>,
    pub state: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub founded_year: Option<i32>,
    pub fee_structure: Option<String>,
    pub client_types: Option<Vec<String>>,
    pub verified: Option<bool>,
    pub premium: Option<bool>,
    pub rating: Option<Decimal>,
    pub review_count: Option<i32>,
}

impl FirmCommonInput {
    fn check(&self, errors: &mut FieldErrors, creating: bool) {
        match &self.name {
            Some(name) if name.trim().is_empty() => errors.add("name", "Name is required"),
            None if creating => errors.add("name", "Name is required"),
            _ => {}
        }
        catalog::check_state(errors, "state", self.state.as_deref());
        if let Some(types) = &self.client_types {
            catalog::check_members(errors, "client_types", CLIENT_TYPES, types);
        }
        if let Some(rating) = self.rating {
            if rating < Decimal::ZERO || rating > dec!(5.0) {
                errors.add("rating", "Rating must be between 0 and 5");
            }
        }
        if matches!(self.review_count, Some(n) if n < 0) {
            errors.add("review_count", "Review count cannot be negative");
        }
        if let Some(year) = self.founded_year {
            if !(1700..=2100).contains(&year) {
                errors.add("founded_year", "Founded year looks wrong");
            }
        }
    }
}

/// Body of POST/PATCH /api/admin/investment-firms
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvestmentFirmInput {
    #[serde(flatten)]
    pub common: FirmCommonInput,
    pub aum: Option<String>,
    pub minimum_investment: Option<String>,
    pub asset_classes: Option<Vec<String>>,
    #[serde(flatten)]
    pub children: FirmChildrenInput,
}

impl InvestmentFirmInput {
    pub fn validate(&self, creating: bool) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        self.common.check(&mut errors, creating);
        if let Some(classes) = &self.asset_classes {
            catalog::check_members(&mut errors, "asset_classes", ASSET_CLASSES, classes);
        }
        self.children.check(&mut errors);
        errors.into_result()
    }
}

/// Body of POST/PATCH /api/admin/accounting-firms
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountingFirmInput {
    #[serde(flatten)]
    pub common: FirmCommonInput,
    pub minimum_fee: Option<String>,
    pub services: Option<Vec<String>>,
    #[serde(flatten)]
    pub children: FirmChildrenInput,
}

impl AccountingFirmInput {
    pub fn validate(&self, creating: bool) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        self.common.check(&mut errors, creating);
        if let Some(services) = &self.services {
            catalog::check_members(&mut errors, "services", ACCOUNTING_SERVICES, services);
        }
        self.children.check(&mut errors);
        errors.into_result()
    }
}

/// Query parameters for GET /api/investment-firms
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvestmentFirmListQuery {
    pub search: Option<String>,
    pub state: Option<String>,
    pub client_type: Option<String>,
    /// Comma-separated asset classes; a match must cover every one
    pub asset_class: Option<String>,
    pub min_assets: Option<AssetBucket>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct InvestmentFirmFilters {
    pub search: Option<String>,
    pub state: Option<String>,
    pub client_type: Option<String>,
    pub asset_classes: Vec<String>,
    pub min_assets: Option<AssetBucket>,
    pub pagination: Pagination,
}

impl InvestmentFirmListQuery {
    pub fn normalize(&self) -> Result<InvestmentFirmFilters, FieldErrors> {
        let mut errors = FieldErrors::new();
        let pagination = Pagination::from_query(self.page, self.per_page, &mut errors);
        let (state, client_type) =
            common_filters(&mut errors, self.state.as_deref(), self.client_type.as_deref());
        let asset_classes = split_multi(self.asset_class.as_deref());
        catalog::check_members(&mut errors, "asset_class", ASSET_CLASSES, &asset_classes);
        errors.into_result()?;

        Ok(InvestmentFirmFilters {
            search: non_blank(self.search.as_deref()).map(|s| s.to_lowercase()),
            state,
            client_type,
            asset_classes,
            min_assets: self.min_assets,
            pagination,
        })
    }
}

/// Query parameters for GET /api/accounting-firms
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountingFirmListQuery {
    pub search: Option<String>,
    pub state: Option<String>,
    pub client_type: Option<String>,
    /// Comma-separated services
    pub service: Option<String>,
    pub min_fee: Option<FeeBucket>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct AccountingFirmFilters {
    pub search: Option<String>,
    pub state: Option<String>,
    pub client_type: Option<String>,
    pub services: Vec<String>,
    pub min_fee: Option<FeeBucket>,
    pub pagination: Pagination,
}

impl AccountingFirmListQuery {
    pub fn normalize(&self) -> Result<AccountingFirmFilters, FieldErrors> {
        let mut errors = FieldErrors::new();
        let pagination = Pagination::from_query(self.page, self.per_page, &mut errors);
        let (state, client_type) =
            common_filters(&mut errors, self.state.as_deref(), self.client_type.as_deref());
        let services = split_multi(self.service.as_deref());
        catalog::check_members(&mut errors, "service", ACCOUNTING_SERVICES, &services);
        errors.into_result()?;

        Ok(AccountingFirmFilters {
            search: non_blank(self.search.as_deref()).map(|s| s.to_lowercase()),
            state,
            client_type,
            services,
            min_fee: self.min_fee,
            pagination,
        })
    }
}

fn common_filters(
    errors: &mut FieldErrors,
    state: Option<&str>,
    client_type: Option<&str>,
) -> (Option<String>, Option<String>) {
    let state = non_blank(state);
    catalog::check_state(errors, "state", state.as_deref());
    let client_type = non_blank(client_type);
    if let Some(ct) = &client_type {
        if !catalog::is_member(CLIENT_TYPES, ct) {
            errors.add("client_type", format!("Unknown value: {}", ct));
        }
    }
    (state, client_type)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentFirmSummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub headquarters: Option<String>,
    pub state: Option<String>,
    pub aum: Option<String>,
    pub minimum_investment: Option<String>,
    pub minimum_investment_bucket: String,
    pub asset_classes: Vec<String>,
    pub verified: bool,
    pub premium: bool,
    pub rating: Option<Decimal>,
    pub review_count: i32,
}

impl From<&investment_firms::Model> for InvestmentFirmSummary {
    fn from(model: &investment_firms::Model) -> Self {
        Self {
            id: model.id,
            name: model.name.clone(),
            slug: model.slug.clone(),
            headquarters: model.headquarters.clone(),
            state: model.state.clone(),
            aum: model.aum.clone(),
            minimum_investment: model.minimum_investment.clone(),
            minimum_investment_bucket: AssetBucket::for_amount(model.minimum_investment_amount)
                .label()
                .to_string(),
            asset_classes: json_list(&model.asset_classes),
            verified: model.verified,
            premium: model.premium,
            rating: model.rating,
            review_count: model.review_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountingFirmSummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub headquarters: Option<String>,
    pub state: Option<String>,
    pub minimum_fee: Option<String>,
    pub minimum_fee_bucket: String,
    pub services: Vec<String>,
    pub verified: bool,
    pub premium: bool,
    pub rating: Option<Decimal>,
    pub review_count: i32,
}

impl From<&accounting_firms::Model> for AccountingFirmSummary {
    fn from(model: &accounting_firms::Model) -> Self {
        Self {
            id: model.id,
            name: model.name.clone(),
            slug: model.slug.clone(),
            headquarters: model.headquarters.clone(),
            state: model.state.clone(),
            minimum_fee: model.minimum_fee.clone(),
            minimum_fee_bucket: FeeBucket::for_amount(model.minimum_fee_amount)
                .label()
                .to_string(),
            services: json_list(&model.services),
            verified: model.verified,
            premium: model.premium,
            rating: model.rating,
            review_count: model.review_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderResponse {
    pub name: String,
    pub title: String,
    pub bio: Option<String>,
}

impl From<firm_leaders::Model> for LeaderResponse {
    fn from(model: firm_leaders::Model) -> Self {
        Self {
            name: model.name,
            title: model.title,
            bio: model.bio,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationResponse {
    pub regulator: String,
    pub registration_number: Option<String>,
}

impl From<firm_registrations::Model> for RegistrationResponse {
    fn from(model: firm_registrations::Model) -> Self {
        Self {
            regulator: model.regulator,
            registration_number: model.registration_number,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarFirmLink {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

/// Child collections attached to a firm detail page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FirmChildren {
    pub leaders: Vec<LeaderResponse>,
    pub features: Vec<String>,
    pub registrations: Vec<RegistrationResponse>,
    pub similar_firms: Vec<SimilarFirmLink>,
}

impl FirmChildren {
    pub fn new(
        leaders: Vec<firm_leaders::Model>,
        features: Vec<firm_features::Model>,
        registrations: Vec<firm_registrations::Model>,
        similar_firms: Vec<SimilarFirmLink>,
    ) -> Self {
        Self {
            leaders: leaders.into_iter().map(LeaderResponse::from).collect(),
            features: features.into_iter().map(|f| f.label).collect(),
            registrations: registrations
                .into_iter()
                .map(RegistrationResponse::from)
                .collect(),
            similar_firms,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentFirmDetail {
    #[serde(flatten)]
    pub summary: InvestmentFirmSummary,
    pub description: Option<String>,
    pub website: Option<String>,
    pub founded_year: Option<i32>,
    pub fee_structure: Option<String>,
    pub client_types: Vec<String>,
    #[serde(flatten)]
    pub children: FirmChildren,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl InvestmentFirmDetail {
    pub fn new(model: investment_firms::Model, children: FirmChildren) -> Self {
        Self {
            summary: InvestmentFirmSummary::from(&model),
            client_types: json_list(&model.client_types),
            description: model.description,
            website: model.website,
            founded_year: model.founded_year,
            fee_structure: model.fee_structure,
            children,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountingFirmDetail {
    #[serde(flatten)]
    pub summary: AccountingFirmSummary,
    pub description: Option<String>,
    pub website: Option<String>,
    pub founded_year: Option<i32>,
    pub fee_structure: Option<String>,
    pub client_types: Vec<String>,
    #[serde(flatten)]
    pub children: FirmChildren,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl AccountingFirmDetail {
    pub fn new(model: accounting_firms::Model, children: FirmChildren) -> Self {
        Self {
            summary: AccountingFirmSummary::from(&model),
            client_types: json_list(&model.client_types),
            description: model.description,
            website: model.website,
            founded_year: model.founded_year,
            fee_structure: model.fee_structure,
            children,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_requires_name() {
        let input = InvestmentFirmInput::default();
        assert!(input.validate(true).unwrap_err().contains("name"));
        // A patch without a name leaves it untouched
        assert!(input.validate(false).is_ok());
    }

    #[test]
    fn test_rating_bounds() {
        let input = AccountingFirmInput {
            common: FirmCommonInput {
                name: Some("Ledger & Co".to_string()),
                rating: Some(dec!(5.5)),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(input.validate(true).unwrap_err().contains("rating"));
    }

    #[test]
    fn test_child_collections_checked() {
        let input = InvestmentFirmInput {
            common: FirmCommonInput {
                name: Some("Summit Capital".to_string()),
                ..Default::default()
            },
            asset_classes: Some(vec!["Equities".to_string(), "Tulips".to_string()]),
            children: FirmChildrenInput {
                leaders: Some(vec![LeaderInput {
                    name: "Ada".to_string(),
                    title: "".to_string(),
                    bio: None,
                }]),
                ..Default::default()
            },
            ..Default::default()
        };
        let errors = input.validate(true).unwrap_err();
        assert!(errors.contains("asset_classes"));
        assert!(errors.contains("leaders"));
    }

    #[test]
    fn test_input_deserializes_flattened_payload() {
        let input: AccountingFirmInput = serde_json::from_value(serde_json::json!({
            "name": "Ledger & Co",
            "minimum_fee": "$100/mo",
            "services": ["Bookkeeping"],
            "features": ["Dedicated CPA"],
        }))
        .unwrap();
        assert_eq!(input.common.name.as_deref(), Some("Ledger & Co"));
        assert_eq!(input.children.features.as_ref().map(Vec::len), Some(1));
        assert!(input.validate(true).is_ok());
    }

    #[test]
    fn test_accounting_filters_parse_fee_bucket() {
        let query: AccountingFirmListQuery = serde_json::from_value(serde_json::json!({
            "min_fee": "under_250",
            "service": "Bookkeeping,Payroll",
        }))
        .unwrap();
        let filters = query.normalize().unwrap();
        assert_eq!(filters.min_fee, Some(FeeBucket::Under250));
        assert_eq!(filters.services, vec!["Bookkeeping", "Payroll"]);
    }
}
