//! Blog posts and categories

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    sea_query::{NullOrdering, OnConflict, Order, Query},
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::blog_posts::{self, PostStatus};
use crate::entities::{blog_categories, blog_post_categories, prelude::*};
use crate::error::{FieldErrors, ServiceError};
use crate::models::blog::{
    CategoryResponse, CreateCategoryRequest, CreatePostRequest, PostFilters, PostResponse,
    PostSummary, UpdatePostRequest,
};
use crate::models::listing::Page;
use crate::services::auth::SessionContext;
use crate::services::markdown;
use crate::services::slug::{slugify, unique_slug};

fn post_not_found() -> ServiceError {
    ServiceError::NotFound("Post".to_string())
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Excerpt to store: the author's when given, otherwise derived from the body.
fn resolve_excerpt(explicit: Option<String>, content: &str) -> Option<String> {
    blank_to_none(explicit).or_else(|| {
        let derived = markdown::excerpt(content);
        (!derived.is_empty()).then_some(derived)
    })
}

async fn categories_for(
    db: &DatabaseConnection,
    post_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<blog_categories::Model>>, ServiceError> {
    let mut by_post: HashMap<Uuid, Vec<blog_categories::Model>> = HashMap::new();
    if post_ids.is_empty() {
        return Ok(by_post);
    }

    let links = BlogPostCategories::find()
        .filter(blog_post_categories::Column::PostId.is_in(post_ids.to_vec()))
        .all(db)
        .await?;
    if links.is_empty() {
        return Ok(by_post);
    }

    let mut category_ids: Vec<i32> = links.iter().map(|l| l.category_id).collect();
    category_ids.sort_unstable();
    category_ids.dedup();
    let categories: HashMap<i32, blog_categories::Model> = BlogCategories::find()
        .filter(blog_categories::Column::Id.is_in(category_ids))
        .order_by_asc(blog_categories::Column::Name)
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    for link in links {
        if let Some(category) = categories.get(&link.category_id) {
            by_post.entry(link.post_id).or_default().push(category.clone());
        }
    }
    for list in by_post.values_mut() {
        list.sort_by(|a, b| a.name.cmp(&b.name));
    }
    Ok(by_post)
}

async fn check_category_ids(db: &DatabaseConnection, ids: &[i32]) -> Result<Vec<i32>, ServiceError> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(ids);
    }
    let found = BlogCategories::find()
        .filter(blog_categories::Column::Id.is_in(ids.clone()))
        .count(db)
        .await?;
    if found != ids.len() as u64 {
        let mut errors = FieldErrors::new();
        errors.add("category_ids", "Unknown category");
        return Err(errors.into());
    }
    Ok(ids)
}

async fn check_slug_free(
    db: &DatabaseConnection,
    slug: &str,
    except: Option<Uuid>,
) -> Result<(), ServiceError> {
    let mut query = BlogPosts::find().filter(blog_posts::Column::Slug.eq(slug));
    if let Some(id) = except {
        query = query.filter(blog_posts::Column::Id.ne(id));
    }
    if query.count(db).await? > 0 {
        return Err(ServiceError::Conflict(format!(
            "A post with slug '{}' already exists",
            slug
        )));
    }
    Ok(())
}

async fn post_response(
    db: &DatabaseConnection,
    post: blog_posts::Model,
    can_edit: bool,
) -> Result<PostResponse, ServiceError> {
    let categories = post
        .find_related(BlogCategories)
        .order_by_asc(blog_categories::Column::Name)
        .all(db)
        .await?;
    Ok(PostResponse::new(post, categories, can_edit))
}

/// Newest first; drafts (no `published_at`) after published posts.
pub async fn list(db: &DatabaseConnection, filters: &PostFilters) -> Result<Page<PostSummary>, ServiceError> {
    let mut condition = Condition::all();
    if !filters.include_drafts {
        condition = condition.add(blog_posts::Column::Status.eq(PostStatus::Published));
    }
    if let Some(slug) = &filters.category {
        let category = BlogCategories::find()
            .filter(blog_categories::Column::Slug.eq(slug.as_str()))
            .one(db)
            .await?;
        let Some(category) = category else {
            return Ok(Page::new(Vec::new(), 0, filters.pagination));
        };
        condition = condition.add(
            blog_posts::Column::Id.in_subquery(
                Query::select()
                    .column(blog_post_categories::Column::PostId)
                    .from(BlogPostCategories)
                    .and_where(blog_post_categories::Column::CategoryId.eq(category.id))
                    .to_owned(),
            ),
        );
    }

    let select = BlogPosts::find().filter(condition);
    let total = select.clone().count(db).await?;
    let posts = select
        .order_by_with_nulls(blog_posts::Column::PublishedAt, Order::Desc, NullOrdering::Last)
        .order_by_desc(blog_posts::Column::CreatedAt)
        .offset(filters.pagination.offset())
        .limit(filters.pagination.per_page)
        .all(db)
        .await?;

    let ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
    let mut categories = categories_for(db, &ids).await?;
    let items = posts
        .iter()
        .map(|post| PostSummary::new(post, categories.remove(&post.id).unwrap_or_default()))
        .collect();
    Ok(Page::new(items, total, filters.pagination))
}

/// Drafts are only visible to admins.
pub async fn get_by_slug(
    db: &DatabaseConnection,
    slug: &str,
    viewer: Option<&SessionContext>,
) -> Result<PostResponse, ServiceError> {
    let is_admin = viewer.is_some_and(|v| v.is_admin);
    let post = BlogPosts::find()
        .filter(blog_posts::Column::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or_else(post_not_found)?;
    if post.status == PostStatus::Draft && !is_admin {
        return Err(post_not_found());
    }
    post_response(db, post, is_admin).await
}

pub async fn create(
    db: &DatabaseConnection,
    author: &SessionContext,
    req: CreatePostRequest,
) -> Result<PostResponse, ServiceError> {
    if let Err(errors) = req.validate() {
        warn!(fields = %errors, "Blog post rejected");
        return Err(errors.into());
    }
    let category_ids = check_category_ids(db, &req.category_ids).await?;

    let slug = match blank_to_none(req.slug) {
        Some(slug) => {
            check_slug_free(db, &slug, None).await?;
            slug
        }
        None => unique_slug::<BlogPosts>(db, blog_posts::Column::Slug, &req.title).await?,
    };

    let now = Utc::now().fixed_offset();
    let id = Uuid::new_v4();
    let post = blog_posts::ActiveModel {
        id: Set(id),
        title: Set(req.title.trim().to_string()),
        slug: Set(slug),
        excerpt: Set(resolve_excerpt(req.excerpt, &req.content)),
        content: Set(req.content),
        cover_image_url: Set(blank_to_none(req.cover_image_url)),
        status: Set(req.status),
        author_id: Set(Some(author.user_id)),
        published_at: Set((req.status == PostStatus::Published).then_some(now)),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let txn = db.begin().await?;
    let post = post.insert(&txn).await?;
    if !category_ids.is_empty() {
        let links = category_ids.into_iter().map(|category_id| blog_post_categories::ActiveModel {
            post_id: Set(id),
            category_id: Set(category_id),
        });
        BlogPostCategories::insert_many(links).exec_without_returning(&txn).await?;
    }
    txn.commit().await?;

    info!(post_id = %id, slug = %post.slug, status = ?post.status, "Blog post created");
    post_response(db, post, true).await
}

pub async fn update(
    db: &DatabaseConnection,
    id: Uuid,
    req: UpdatePostRequest,
) -> Result<PostResponse, ServiceError> {
    req.validate()?;
    let post = BlogPosts::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(post_not_found)?;
    let category_ids = match &req.category_ids {
        Some(ids) => Some(check_category_ids(db, ids).await?),
        None => None,
    };
    if let Some(slug) = req.slug.as_deref().filter(|s| *s != post.slug) {
        check_slug_free(db, slug, Some(id)).await?;
    }

    let now = Utc::now().fixed_offset();
    let old_content = post.content.clone();
    let refresh_excerpt = post.excerpt.is_none()
        || post.excerpt.as_deref() == Some(markdown::excerpt(&post.content).as_str());
    let first_publish =
        req.status == Some(PostStatus::Published) && post.published_at.is_none();

    let mut active = post.into_active_model();
    if let Some(title) = req.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(slug) = req.slug {
        active.slug = Set(slug);
    }
    if let Some(cover) = req.cover_image_url {
        active.cover_image_url = Set(blank_to_none(Some(cover)));
    }
    match (req.excerpt, req.content) {
        (Some(excerpt), content) => {
            let body = content.clone().unwrap_or(old_content);
            active.excerpt = Set(resolve_excerpt(Some(excerpt), &body));
            if let Some(content) = content {
                active.content = Set(content);
            }
        }
        (None, Some(content)) => {
            // Keep a hand-written excerpt; refresh a derived one
            if refresh_excerpt {
                active.excerpt = Set(resolve_excerpt(None, &content));
            }
            active.content = Set(content);
        }
        (None, None) => {}
    }
    if let Some(status) = req.status {
        active.status = Set(status);
    }
    if first_publish {
        active.published_at = Set(Some(now));
    }
    active.updated_at = Set(now);

    let txn = db.begin().await?;
    let post = active.update(&txn).await?;
    if let Some(ids) = category_ids {
        BlogPostCategories::delete_many()
            .filter(blog_post_categories::Column::PostId.eq(id))
            .exec(&txn)
            .await?;
        if !ids.is_empty() {
            let links = ids.into_iter().map(|category_id| blog_post_categories::ActiveModel {
                post_id: Set(id),
                category_id: Set(category_id),
            });
            BlogPostCategories::insert_many(links).exec_without_returning(&txn).await?;
        }
    }
    txn.commit().await?;

    info!(post_id = %id, status = ?post.status, "Blog post updated");
    post_response(db, post, true).await
}

pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let result = BlogPosts::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(post_not_found());
    }
    info!(post_id = %id, "Blog post deleted");
    Ok(())
}

pub async fn list_categories(db: &DatabaseConnection) -> Result<Vec<CategoryResponse>, ServiceError> {
    let categories = BlogCategories::find()
        .order_by_asc(blog_categories::Column::Name)
        .all(db)
        .await?;
    Ok(categories.into_iter().map(CategoryResponse::from).collect())
}

pub async fn create_category(
    db: &DatabaseConnection,
    req: CreateCategoryRequest,
) -> Result<CategoryResponse, ServiceError> {
    req.validate()?;
    let name = req.name.trim().to_string();
    let slug = slugify(&name);

    let existing = BlogCategories::find()
        .filter(blog_categories::Column::Slug.eq(slug.as_str()))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(ServiceError::Conflict(format!(
            "Category '{}' already exists",
            name
        )));
    }

    let category = blog_categories::ActiveModel {
        name: Set(name),
        slug: Set(slug),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(category_id = category.id, slug = %category.slug, "Blog category created");
    Ok(CategoryResponse::from(category))
}

/// Attaching an already attached category is a no-op.
pub async fn attach_category(
    db: &DatabaseConnection,
    post_id: Uuid,
    category_id: i32,
) -> Result<(), ServiceError> {
    if BlogPosts::find_by_id(post_id).one(db).await?.is_none() {
        return Err(post_not_found());
    }
    if BlogCategories::find_by_id(category_id).one(db).await?.is_none() {
        return Err(ServiceError::NotFound("Category".to_string()));
    }

    BlogPostCategories::insert(blog_post_categories::ActiveModel {
        post_id: Set(post_id),
        category_id: Set(category_id),
    })
    .on_conflict(
        OnConflict::columns([
            blog_post_categories::Column::PostId,
            blog_post_categories::Column::CategoryId,
        ])
        .do_nothing()
        .to_owned(),
    )
    .exec_without_returning(db)
    .await?;
    Ok(())
}

/// Detaching a category that is not attached is a no-op.
pub async fn detach_category(
    db: &DatabaseConnection,
    post_id: Uuid,
    category_id: i32,
) -> Result<(), ServiceError> {
    BlogPostCategories::delete_many()
        .filter(blog_post_categories::Column::PostId.eq(post_id))
        .filter(blog_post_categories::Column::CategoryId.eq(category_id))
        .exec(db)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn post(status: PostStatus) -> blog_posts::Model {
        let now = Utc::now().fixed_offset();
        blog_posts::Model {
            id: Uuid::new_v4(),
            title: "Choosing a Fee-Only Advisor".to_string(),
            slug: "choosing-a-fee-only-advisor".to_string(),
            content: "Fee-only advisors are paid by clients.".to_string(),
            excerpt: Some("Fee-only advisors are paid by clients.".to_string()),
            cover_image_url: None,
            status,
            author_id: None,
            published_at: (status == PostStatus::Published).then_some(now),
            created_at: now,
            updated_at: now,
        }
    }

    fn session(is_admin: bool) -> SessionContext {
        SessionContext {
            user_id: Uuid::new_v4(),
            email: "editor@example.com".to_string(),
            is_admin,
            expires_at: Utc::now().fixed_offset(),
        }
    }

    #[test]
    fn test_resolve_excerpt() {
        assert_eq!(
            resolve_excerpt(Some("  Hand written  ".to_string()), "# Body"),
            Some("Hand written".to_string())
        );
        assert_eq!(
            resolve_excerpt(None, "## Body **text**"),
            Some("Body text".to_string())
        );
        assert_eq!(resolve_excerpt(Some(" ".to_string()), "![x](y.png)"), None);
    }

    #[tokio::test]
    async fn test_draft_hidden_from_public() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![post(PostStatus::Draft)]])
            .into_connection();
        let err = get_by_slug(&db, "choosing-a-fee-only-advisor", None).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![post(PostStatus::Draft)]])
            .into_connection();
        let reader = session(false);
        let err = get_by_slug(&db, "choosing-a-fee-only-advisor", Some(&reader)).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_draft_visible_to_admin_with_edit_flag() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![post(PostStatus::Draft)]])
            .append_query_results([Vec::<blog_categories::Model>::new()])
            .into_connection();
        let admin = session(true);
        let response = get_by_slug(&db, "choosing-a-fee-only-advisor", Some(&admin)).await.unwrap();
        assert!(response.can_edit);
        assert!(response.summary.is_draft);
    }

    #[tokio::test]
    async fn test_create_requires_title_before_queries() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let req = CreatePostRequest {
            title: " ".to_string(),
            content: "Body".to_string(),
            slug: None,
            excerpt: None,
            cover_image_url: None,
            status: PostStatus::Draft,
            category_ids: vec![],
        };
        let err = create(&db, &session(true), req).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref f) if f.contains("title")));
        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn test_detach_is_idempotent() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        assert!(detach_category(&db, Uuid::new_v4(), 3).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_category_slug_gives_empty_page() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<blog_categories::Model>::new()])
            .into_connection();
        let filters = PostFilters {
            category: Some("taxes".to_string()),
            ..Default::default()
        };
        let page = list(&db, &filters).await.unwrap();
        assert_eq!(page.total, 0);
        assert!(page.items.is_empty());
    }
}
