//! `SeaORM` Entity for investment_firms

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "investment_firms")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub headquarters: Option<String>,
    pub state: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub website: Option<String>,
    pub founded_year: Option<i32>,
    /// Assets under management as displayed, e.g. "$2.4B"
    pub aum: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub fee_structure: Option<String>,
    pub minimum_investment: Option<String>,
    pub minimum_investment_amount: Option<i64>,
    #[sea_orm(column_type = "JsonBinary")]
    pub asset_classes: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub client_types: Json,
    pub verified: bool,
    pub premium: bool,
    #[sea_orm(column_type = "Decimal(Some((2, 1)))", nullable)]
    pub rating: Option<Decimal>,
    pub review_count: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::advisors::Entity")]
    Advisors,
}

impl Related<super::advisors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Advisors.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
