//! `SeaORM` Entity for accounting_firms

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "accounting_firms")]
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
    #[sea_orm(column_type = "Text", nullable)]
    pub fee_structure: Option<String>,
    /// Free text as entered, e.g. "$100/mo"
    pub minimum_fee: Option<String>,
    pub minimum_fee_amount: Option<i64>,
    #[sea_orm(column_type = "JsonBinary")]
    pub services: Json,
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
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
