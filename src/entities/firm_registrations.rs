use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::firm_kind::FirmKind;

/// Regulatory registration of a firm (SEC, FINRA, state boards, ...)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "firm_registrations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub firm_kind: FirmKind,
    pub firm_id: Uuid,
    pub regulator: String,
    pub registration_number: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
