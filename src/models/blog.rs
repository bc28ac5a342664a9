use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::blog_categories;
use crate::entities::blog_posts::{self, PostStatus};
use crate::error::FieldErrors;
use crate::models::listing::{non_blank, Pagination};

pub const EXCERPT_LENGTH: usize = 160;

/// Body of POST /api/admin/blog/posts
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub cover_image_url: Option<String>,
    #[serde(default = "default_status")]
    pub status: PostStatus,
    #[serde(default)]
    pub category_ids: Vec<i32>,
}

fn default_status() -> PostStatus {
    PostStatus::Draft
}

impl CreatePostRequest {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.title.trim().is_empty() {
            errors.add("title", "Title is required");
        }
        if self.content.trim().is_empty() {
            errors.add("content", "Content is required");
        }
        check_slug(&mut errors, self.slug.as_deref());
        errors.into_result()
    }
}

/// Body of PATCH /api/admin/blog/posts/{id}
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub cover_image_url: Option<String>,
    pub status: Option<PostStatus>,
    /// Replaces the post's categories when present
    pub category_ids: Option<Vec<i32>>,
}

impl UpdatePostRequest {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if matches!(&self.title, Some(t) if t.trim().is_empty()) {
            errors.add("title", "Title is required");
        }
        if matches!(&self.content, Some(c) if c.trim().is_empty()) {
            errors.add("content", "Content is required");
        }
        check_slug(&mut errors, self.slug.as_deref());
        errors.into_result()
    }
}

fn check_slug(errors: &mut FieldErrors, slug: Option<&str>) {
    if let Some(slug) = slug {
        let valid = !slug.is_empty()
            && slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid {
            errors.add("slug", "Slug may only contain lowercase letters, digits and dashes");
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

impl CreateCategoryRequest {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "Name is required");
        }
        errors.into_result()
    }
}

/// Query parameters for GET /api/blog/posts
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostListQuery {
    /// Category slug
    pub category: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct PostFilters {
    pub category: Option<String>,
    pub include_drafts: bool,
    pub pagination: Pagination,
}

impl PostListQuery {
    pub fn normalize(&self, include_drafts: bool) -> Result<PostFilters, FieldErrors> {
        let mut errors = FieldErrors::new();
        let pagination = Pagination::from_query(self.page, self.per_page, &mut errors);
        errors.into_result()?;
        Ok(PostFilters {
            category: non_blank(self.category.as_deref()),
            include_drafts,
            pagination,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

impl From<blog_categories::Model> for CategoryResponse {
    fn from(model: blog_categories::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub cover_image_url: Option<String>,
    pub status: PostStatus,
    /// Drives the "Draft" badge in admin views
    pub is_draft: bool,
    pub published_at: Option<DateTime<FixedOffset>>,
    pub categories: Vec<CategoryResponse>,
}

impl PostSummary {
    pub fn new(model: &blog_posts::Model, categories: Vec<blog_categories::Model>) -> Self {
        Self {
            id: model.id,
            title: model.title.clone(),
            slug: model.slug.clone(),
            excerpt: model.excerpt.clone(),
            cover_image_url: model.cover_image_url.clone(),
            status: model.status,
            is_draft: model.status == PostStatus::Draft,
            published_at: model.published_at,
            categories: categories.into_iter().map(CategoryResponse::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    #[serde(flatten)]
    pub summary: PostSummary,
    pub content: String,
    pub author_id: Option<Uuid>,
    pub can_edit: bool,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl PostResponse {
    pub fn new(
        model: blog_posts::Model,
        categories: Vec<blog_categories::Model>,
        can_edit: bool,
    ) -> Self {
        Self {
            summary: PostSummary::new(&model, categories),
            content: model.content,
            author_id: model.author_id,
            can_edit,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Formatting actions offered by the markdown insertion helper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkdownFormat {
    Bold,
    Italic,
    Heading1,
    Heading2,
    Heading3,
    BulletList,
    NumberedList,
    Link,
    Image,
    Quote,
    Code,
}

/// Character offsets into the editor content; `start == end` is a caret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormatRequest {
    pub content: String,
    #[serde(default)]
    pub selection: Selection,
    pub format: MarkdownFormat,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatResponse {
    pub content: String,
    pub selection: Selection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}
