//! Advisor directory and self-service endpoints

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{info, warn};

use crate::error::{map_service_error, validation_error, ApiError};
use crate::extract::{CurrentUser, MaybeUser};
use crate::handlers::upload::read_file_field;
use crate::models::advisor::{
    AdvisorListQuery, AdvisorResponse, AdvisorSummary, OwnAdvisorResponse,
    RegisterAdvisorRequest, UpdateAdvisorRequest,
};
use crate::models::listing::Page;
use crate::services::advisors;
use crate::services::storage::{upload_image, HEADSHOT_BUCKET};
use crate::AppState;

/// Approved advisors, filtered and paginated
///
/// GET /api/advisors
///
/// # Query Parameters
///
/// - `search` - Substring of name, firm or city (case-insensitive)
/// - `state` - US state name
/// - `client_type` - One client type
/// - `specialty` - Comma-separated services; every one must be offered
/// - `min_assets` - `no_minimum | under_100k | 100k_500k | 500k_1m | 1m_plus`
/// - `page`, `per_page` - 1-based page, default 12 per page
pub async fn list_advisors(
    State(state): State<AppState>,
    Query(query): Query<AdvisorListQuery>,
) -> Result<Json<Page<AdvisorSummary>>, ApiError> {
    let filters = query.normalize().map_err(|errors| {
        warn!(fields = %errors, "Invalid advisor filters");
        validation_error(errors)
    })?;

    let key = filters.clone();
    let db = state.db.clone();
    let page = state
        .caches
        .advisors
        .get_or_load(&key, || async move { advisors::list_public(&db, &filters).await })
        .await
        .map_err(map_service_error)?;

    info!(count = page.items.len(), total = page.total, "Advisor list returned");
    Ok(Json(page.as_ref().clone()))
}

/// GET /api/advisors/{slug}
pub async fn get_advisor(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(slug): Path<String>,
) -> Result<Json<AdvisorResponse>, ApiError> {
    advisors::get_by_slug(&state.db, &slug, viewer.as_ref())
        .await
        .map(Json)
        .map_err(map_service_error)
}

/// POST /api/advisors/register
pub async fn register_advisor(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<RegisterAdvisorRequest>,
) -> Result<(StatusCode, Json<AdvisorResponse>), ApiError> {
    info!(user_id = %user.user_id, save_as_draft = payload.save_as_draft, "Advisor registration received");
    let advisor = advisors::register(&state.db, &user, payload)
        .await
        .map_err(map_service_error)?;
    Ok((StatusCode::CREATED, Json(advisor)))
}

/// GET /api/advisors/me
pub async fn get_own_advisor(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<OwnAdvisorResponse>, ApiError> {
    advisors::get_own(&state.db, user.user_id)
        .await
        .map(Json)
        .map_err(map_service_error)
}

/// PATCH /api/advisors/me
pub async fn update_own_advisor(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<UpdateAdvisorRequest>,
) -> Result<Json<AdvisorResponse>, ApiError> {
    advisors::update_own(&state.db, user.user_id, payload)
        .await
        .map(Json)
        .map_err(map_service_error)
}

/// POST /api/advisors/me/submit
pub async fn submit_own_advisor(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<AdvisorResponse>, ApiError> {
    advisors::submit_own(&state.db, user.user_id)
        .await
        .map(Json)
        .map_err(map_service_error)
}

/// POST /api/advisors/me/headshot (multipart, field `file`)
pub async fn upload_headshot(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    multipart: Multipart,
) -> Result<Json<AdvisorResponse>, ApiError> {
    let advisor = advisors::find_own_editable(&state.db, user.user_id)
        .await
        .map_err(map_service_error)?;
    let (bytes, content_type) = read_file_field(multipart).await?;

    let url = upload_image(state.storage.as_ref(), HEADSHOT_BUCKET, bytes, &content_type)
        .await
        .map_err(map_service_error)?;
    info!(advisor_id = %advisor.id, url = %url, "Headshot uploaded");

    advisors::set_headshot(&state.db, advisor, url)
        .await
        .map(Json)
        .map_err(map_service_error)
}
