//! Discriminator shared by the firm child-collection tables

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum FirmKind {
    #[sea_orm(string_value = "investment")]
    Investment,
    #[sea_orm(string_value = "accounting")]
    Accounting,
}
