//! `SeaORM` Entity for advisors
//!
//! Categorical attributes (services, designations, ...) are stored as JSONB
//! arrays of catalogue labels.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Advisor approval lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum AdvisorStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "pending_approval")]
    PendingApproval,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl AdvisorStatus {
    /// Allowed edges: draft -> pending_approval -> {approved, rejected}.
    pub fn can_transition_to(self, next: AdvisorStatus) -> bool {
        matches!(
            (self, next),
            (AdvisorStatus::Draft, AdvisorStatus::PendingApproval)
                | (AdvisorStatus::PendingApproval, AdvisorStatus::Approved)
                | (AdvisorStatus::PendingApproval, AdvisorStatus::Rejected)
        )
    }

    /// Owners may edit their record until it is approved.
    pub fn is_owner_editable(self) -> bool {
        self != AdvisorStatus::Approved
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AdvisorStatus::Draft => "draft",
            AdvisorStatus::PendingApproval => "pending_approval",
            AdvisorStatus::Approved => "approved",
            AdvisorStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for AdvisorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "advisors")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning user account
    #[sea_orm(unique)]
    pub user_id: Option<Uuid>,
    /// Linked investment firm
    pub firm_id: Option<Uuid>,
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub firm_name: String,
    pub position: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub personal_bio: String,
    #[sea_orm(column_type = "Text")]
    pub firm_bio: String,
    pub email: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub years_of_experience: i32,
    /// Free text as entered, e.g. "$250k"
    pub minimum_investment: Option<String>,
    /// Parsed from `minimum_investment` at write time; drives bucket filters
    pub minimum_investment_amount: Option<i64>,
    #[sea_orm(column_type = "JsonBinary")]
    pub services: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub designations: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub licenses: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub compensation_types: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub client_types: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub registered_states: Json,
    #[sea_orm(column_type = "Text", nullable)]
    pub headshot_url: Option<String>,
    pub status: AdvisorStatus,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_type = "Text", nullable)]
    pub rejection_reason: Option<String>,
    pub verified: bool,
    pub premium: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::investment_firms::Entity",
        from = "Column::FirmId",
        to = "super::investment_firms::Column::Id"
    )]
    InvestmentFirm,
    #[sea_orm(has_many = "super::meeting_requests::Entity")]
    MeetingRequests,
}

impl Related<super::investment_firms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvestmentFirm.def()
    }
}

impl Related<super::meeting_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MeetingRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_forward_transitions_allowed() {
        use AdvisorStatus::*;
        assert!(Draft.can_transition_to(PendingApproval));
        assert!(PendingApproval.can_transition_to(Approved));
        assert!(PendingApproval.can_transition_to(Rejected));

        assert!(!Draft.can_transition_to(Approved));
        assert!(!Approved.can_transition_to(PendingApproval));
        assert!(!Rejected.can_transition_to(PendingApproval));
        assert!(!Rejected.can_transition_to(Approved));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!PendingApproval.can_transition_to(PendingApproval));
    }

    #[test]
    fn test_approved_is_not_owner_editable() {
        assert!(!AdvisorStatus::Approved.is_owner_editable());
        assert!(AdvisorStatus::Draft.is_owner_editable());
        assert!(AdvisorStatus::PendingApproval.is_owner_editable());
        assert!(AdvisorStatus::Rejected.is_owner_editable());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&AdvisorStatus::PendingApproval).unwrap();
        assert_eq!(json, "\"pending_approval\"");
    }
}
