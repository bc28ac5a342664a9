use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::firm_kind::FirmKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "firm_leaders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub firm_kind: FirmKind,
    pub firm_id: Uuid,
    pub name: String,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
