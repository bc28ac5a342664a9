use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "blog_categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::blog_post_categories::Entity")]
    BlogPostCategories,
}

impl Related<super::blog_post_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BlogPostCategories.def()
    }
}

impl Related<super::blog_posts::Entity> for Entity {
    fn to() -> RelationDef {
        super::blog_post_categories::Relation::Post.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::blog_post_categories::Relation::Category.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
