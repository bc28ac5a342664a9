//! Blog reading, authoring and editor helpers

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{map_service_error, validation_error, ApiError};
use crate::extract::{AdminUser, MaybeUser};
use crate::handlers::upload::read_file_field;
use crate::models::blog::{
    CategoryResponse, CreateCategoryRequest, CreatePostRequest, FormatRequest, FormatResponse,
    PostListQuery, PostResponse, PostSummary, UpdatePostRequest, UploadResponse,
};
use crate::models::listing::Page;
use crate::services::blog;
use crate::services::markdown::apply_format;
use crate::services::storage::{upload_image, BLOG_IMAGE_BUCKET};
use crate::AppState;

/// GET /api/blog/posts
///
/// Admins also see drafts, flagged with `is_draft`.
pub async fn list_posts(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Query(query): Query<PostListQuery>,
) -> Result<Json<Page<PostSummary>>, ApiError> {
    let include_drafts = viewer.as_ref().is_some_and(|v| v.is_admin);
    let filters = query.normalize(include_drafts).map_err(|errors| {
        warn!(fields = %errors, "Invalid blog filters");
        validation_error(errors)
    })?;

    let key = filters.clone();
    let db = state.db.clone();
    let page = state
        .caches
        .blog_posts
        .get_or_load(&key, || async move { blog::list(&db, &filters).await })
        .await
        .map_err(map_service_error)?;
    Ok(Json(page.as_ref().clone()))
}

/// GET /api/blog/posts/{slug}
pub async fn get_post(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(slug): Path<String>,
) -> Result<Json<PostResponse>, ApiError> {
    blog::get_by_slug(&state.db, &slug, viewer.as_ref())
        .await
        .map(Json)
        .map_err(map_service_error)
}

/// GET /api/blog/categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    blog::list_categories(&state.db)
        .await
        .map(Json)
        .map_err(map_service_error)
}

/// POST /api/admin/blog/posts
pub async fn create_post(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    let post = blog::create(&state.db, &admin, payload)
        .await
        .map_err(map_service_error)?;
    state.caches.blog_posts.invalidate();
    Ok((StatusCode::CREATED, Json(post)))
}

/// PATCH /api/admin/blog/posts/{id}
pub async fn update_post(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = blog::update(&state.db, id, payload)
        .await
        .map_err(map_service_error)?;
    state.caches.blog_posts.invalidate();
    Ok(Json(post))
}

/// DELETE /api/admin/blog/posts/{id}
pub async fn delete_post(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    blog::delete(&state.db, id)
        .await
        .map_err(map_service_error)?;
    state.caches.blog_posts.invalidate();
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/admin/blog/categories
pub async fn create_category(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    let category = blog::create_category(&state.db, payload)
        .await
        .map_err(map_service_error)?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/admin/blog/posts/{id}/categories/{category_id}
pub async fn attach_category(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path((id, category_id)): Path<(Uuid, i32)>,
) -> Result<StatusCode, ApiError> {
    blog::attach_category(&state.db, id, category_id)
        .await
        .map_err(map_service_error)?;
    state.caches.blog_posts.invalidate();
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/admin/blog/posts/{id}/categories/{category_id}
pub async fn detach_category(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path((id, category_id)): Path<(Uuid, i32)>,
) -> Result<StatusCode, ApiError> {
    blog::detach_category(&state.db, id, category_id)
        .await
        .map_err(map_service_error)?;
    state.caches.blog_posts.invalidate();
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/admin/blog/images (multipart, field `file`)
pub async fn upload_blog_image(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let (bytes, content_type) = read_file_field(multipart).await?;
    let url = upload_image(state.storage.as_ref(), BLOG_IMAGE_BUCKET, bytes, &content_type)
        .await
        .map_err(map_service_error)?;
    info!(admin_id = %admin.user_id, url = %url, "Blog image uploaded");
    Ok((StatusCode::CREATED, Json(UploadResponse { url })))
}

/// POST /api/admin/blog/format
pub async fn format_markdown(
    AdminUser(_admin): AdminUser,
    Json(payload): Json<FormatRequest>,
) -> Json<FormatResponse> {
    let (content, selection) = apply_format(
        &payload.content,
        payload.selection,
        payload.format,
        payload.url.as_deref(),
    );
    Json(FormatResponse { content, selection })
}
