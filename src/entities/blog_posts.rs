//! `SeaORM` Entity for blog_posts

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "published")]
    Published,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "blog_posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    /// Markdown body
    #[sea_orm(column_type = "Text")]
    pub content: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub excerpt: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub cover_image_url: Option<String>,
    pub status: PostStatus,
    pub author_id: Option<Uuid>,
    pub published_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
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

impl Related<super::blog_categories::Entity> for Entity {
    fn to() -> RelationDef {
        super::blog_post_categories::Relation::Category.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::blog_post_categories::Relation::Post.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
