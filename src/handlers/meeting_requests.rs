//! Meeting request intake and follow-up

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{map_service_error, ApiError, ServiceError};
use crate::extract::{AdminUser, ClientKey, CurrentUser};
use crate::models::meeting_request::{
    AdminMeetingListQuery, CreateMeetingRequest, MeetingRequestResponse,
    UpdateMeetingStatusRequest,
};
use crate::services::meeting_requests;
use crate::AppState;

/// POST /api/advisors/{id}/meeting-requests
///
/// Anonymous callers allowed; limited per client address.
pub async fn create_meeting_request(
    State(state): State<AppState>,
    ClientKey(client): ClientKey,
    Path(advisor_id): Path<Uuid>,
    Json(payload): Json<CreateMeetingRequest>,
) -> Result<(StatusCode, Json<MeetingRequestResponse>), ApiError> {
    if !state.rate_limiter.check_and_record(&client) {
        warn!(client = %client, advisor_id = %advisor_id, "Meeting request rate limit exceeded");
        return Err(map_service_error(ServiceError::RateLimited));
    }

    info!(advisor_id = %advisor_id, topics = payload.topics.len(), "Meeting request received");
    let request = meeting_requests::create(&state.db, advisor_id, payload)
        .await
        .map_err(map_service_error)?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// GET /api/advisors/me/meeting-requests
pub async fn list_own_meeting_requests(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<MeetingRequestResponse>>, ApiError> {
    meeting_requests::list_for_owner(&state.db, user.user_id)
        .await
        .map(Json)
        .map_err(map_service_error)
}

/// GET /api/admin/meeting-requests?advisor_id=…
pub async fn admin_list_meeting_requests(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(query): Query<AdminMeetingListQuery>,
) -> Result<Json<Vec<MeetingRequestResponse>>, ApiError> {
    meeting_requests::admin_list(&state.db, query.advisor_id)
        .await
        .map(Json)
        .map_err(map_service_error)
}

/// PATCH /api/meeting-requests/{id}
pub async fn update_meeting_request_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMeetingStatusRequest>,
) -> Result<Json<MeetingRequestResponse>, ApiError> {
    meeting_requests::update_status(&state.db, &user, id, payload.status)
        .await
        .map(Json)
        .map_err(map_service_error)
}
