//! Investment and accounting firm directories and their admin CRUD

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{map_service_error, validation_error, ApiError};
use crate::extract::AdminUser;
use crate::models::firm::{
    AccountingFirmDetail, AccountingFirmInput, AccountingFirmListQuery, AccountingFirmSummary,
    InvestmentFirmDetail, InvestmentFirmInput, InvestmentFirmListQuery, InvestmentFirmSummary,
};
use crate::models::listing::Page;
use crate::services::firms;
use crate::AppState;

/// GET /api/investment-firms
///
/// Filters: `search`, `state`, `client_type`, `asset_class` (comma-separated),
/// `min_assets` bucket, `page`, `per_page`.
pub async fn list_investment_firms(
    State(state): State<AppState>,
    Query(query): Query<InvestmentFirmListQuery>,
) -> Result<Json<Page<InvestmentFirmSummary>>, ApiError> {
    let filters = query.normalize().map_err(|errors| {
        warn!(fields = %errors, "Invalid investment firm filters");
        validation_error(errors)
    })?;

    let key = filters.clone();
    let db = state.db.clone();
    let page = state
        .caches
        .investment_firms
        .get_or_load(&key, || async move { firms::list_investment(&db, &filters).await })
        .await
        .map_err(map_service_error)?;

    info!(count = page.items.len(), total = page.total, "Investment firm list returned");
    Ok(Json(page.as_ref().clone()))
}

/// GET /api/investment-firms/{slug}
pub async fn get_investment_firm(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<InvestmentFirmDetail>, ApiError> {
    firms::investment_by_slug(&state.db, &slug)
        .await
        .map(Json)
        .map_err(map_service_error)
}

/// GET /api/accounting-firms
///
/// Filters: `search`, `state`, `client_type`, `service` (comma-separated),
/// `min_fee` bucket, `page`, `per_page`.
pub async fn list_accounting_firms(
    State(state): State<AppState>,
    Query(query): Query<AccountingFirmListQuery>,
) -> Result<Json<Page<AccountingFirmSummary>>, ApiError> {
    let filters = query.normalize().map_err(|errors| {
        warn!(fields = %errors, "Invalid accounting firm filters");
        validation_error(errors)
    })?;

    let key = filters.clone();
    let db = state.db.clone();
    let page = state
        .caches
        .accounting_firms
        .get_or_load(&key, || async move { firms::list_accounting(&db, &filters).await })
        .await
        .map_err(map_service_error)?;

    info!(count = page.items.len(), total = page.total, "Accounting firm list returned");
    Ok(Json(page.as_ref().clone()))
}

/// GET /api/accounting-firms/{slug}
pub async fn get_accounting_firm(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<AccountingFirmDetail>, ApiError> {
    firms::accounting_by_slug(&state.db, &slug)
        .await
        .map(Json)
        .map_err(map_service_error)
}

/// POST /api/admin/investment-firms
pub async fn create_investment_firm(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(payload): Json<InvestmentFirmInput>,
) -> Result<(StatusCode, Json<InvestmentFirmDetail>), ApiError> {
    let firm = firms::create_investment(&state.db, payload)
        .await
        .map_err(map_service_error)?;
    state.caches.investment_firms.invalidate();
    Ok((StatusCode::CREATED, Json(firm)))
}

/// PATCH /api/admin/investment-firms/{id}
pub async fn update_investment_firm(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<InvestmentFirmInput>,
) -> Result<Json<InvestmentFirmDetail>, ApiError> {
    let firm = firms::update_investment(&state.db, id, payload)
        .await
        .map_err(map_service_error)?;
    state.caches.investment_firms.invalidate();
    Ok(Json(firm))
}

/// DELETE /api/admin/investment-firms/{id}
pub async fn delete_investment_firm(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    firms::delete_investment(&state.db, id)
        .await
        .map_err(map_service_error)?;
    state.caches.investment_firms.invalidate();
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/admin/accounting-firms
pub async fn create_accounting_firm(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(payload): Json<AccountingFirmInput>,
) -> Result<(StatusCode, Json<AccountingFirmDetail>), ApiError> {
    let firm = firms::create_accounting(&state.db, payload)
        .await
        .map_err(map_service_error)?;
    state.caches.accounting_firms.invalidate();
    Ok((StatusCode::CREATED, Json(firm)))
}

/// PATCH /api/admin/accounting-firms/{id}
pub async fn update_accounting_firm(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AccountingFirmInput>,
) -> Result<Json<AccountingFirmDetail>, ApiError> {
    let firm = firms::update_accounting(&state.db, id, payload)
        .await
        .map_err(map_service_error)?;
    state.caches.accounting_firms.invalidate();
    Ok(Json(firm))
}

/// DELETE /api/admin/accounting-firms/{id}
pub async fn delete_accounting_firm(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    firms::delete_accounting(&state.db, id)
        .await
        .map_err(map_service_error)?;
    state.caches.accounting_firms.invalidate();
    Ok(StatusCode::NO_CONTENT)
}
