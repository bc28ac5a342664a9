use axum::Json;

use crate::models::catalog::CatalogResponse;

/// GET /api/catalog
pub async fn get_catalog() -> Json<CatalogResponse> {
    Json(CatalogResponse::build())
}
