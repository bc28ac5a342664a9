use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::firm_kind::FirmKind;

/// Directed "similar firms" link between two firms of the same kind
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "similar_firms")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub firm_kind: FirmKind,
    pub firm_id: Uuid,
    pub similar_firm_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
