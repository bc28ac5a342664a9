use axum::{extract::State, Json};
use tracing::info;

use crate::error::{map_service_error, ApiError};
use crate::models::newsletter::{NewsletterRequest, NewsletterResponse};
use crate::services::newsletter;
use crate::AppState;

/// POST /api/newsletter
pub async fn subscribe(
    State(state): State<AppState>,
    Json(payload): Json<NewsletterRequest>,
) -> Result<Json<NewsletterResponse>, ApiError> {
    info!("Newsletter signup received");
    newsletter::subscribe(&state.db, payload)
        .await
        .map_err(map_service_error)?;
    Ok(Json(NewsletterResponse { success: true }))
}
