use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::meeting_requests::{self, MeetingStatus};
use crate::entities::{advisors, prelude::*};
use crate::error::ServiceError;
use crate::models::meeting_request::{CreateMeetingRequest, MeetingRequestResponse};
use crate::services::advisors as advisor_service;
use crate::services::auth::SessionContext;

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Store a meeting request for an approved advisor. Always starts as pending.
pub async fn create(
    db: &DatabaseConnection,
    advisor_id: Uuid,
    req: CreateMeetingRequest,
) -> Result<MeetingRequestResponse, ServiceError> {
    if let Err(errors) = req.validate() {
        warn!(advisor_id = %advisor_id, fields = %errors, "Meeting request rejected");
        return Err(errors.into());
    }
    let advisor = advisor_service::find_approved(db, advisor_id).await?;

    let now = Utc::now().fixed_offset();
    let request = meeting_requests::ActiveModel {
        id: Set(Uuid::new_v4()),
        advisor_id: Set(advisor.id),
        name: Set(req.name.trim().to_string()),
        email: Set(req.email.trim().to_lowercase()),
        phone: Set(blank_to_none(req.phone)),
        preferred_contact_method: Set(req.preferred_contact_method),
        topics: Set(json!(req.topics)),
        message: Set(blank_to_none(req.message)),
        status: Set(MeetingStatus::Pending),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    info!(request_id = %request.id, advisor_id = %advisor.id, "Meeting request received");
    Ok(MeetingRequestResponse::new(request, Some(advisor.name)))
}

/// Requests addressed to the caller's own advisor record, newest first.
pub async fn list_for_owner(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<Vec<MeetingRequestResponse>, ServiceError> {
    let advisor = advisor_service::find_for_user(db, user_id).await?;
    let requests = MeetingRequests::find()
        .filter(meeting_requests::Column::AdvisorId.eq(advisor.id))
        .order_by_desc(meeting_requests::Column::CreatedAt)
        .all(db)
        .await?;
    Ok(requests
        .into_iter()
        .map(|r| MeetingRequestResponse::new(r, Some(advisor.name.clone())))
        .collect())
}

/// All requests, or one advisor's, with the advisor name attached.
pub async fn admin_list(
    db: &DatabaseConnection,
    advisor_id: Option<Uuid>,
) -> Result<Vec<MeetingRequestResponse>, ServiceError> {
    let mut query = MeetingRequests::find().order_by_desc(meeting_requests::Column::CreatedAt);
    if let Some(advisor_id) = advisor_id {
        query = query.filter(meeting_requests::Column::AdvisorId.eq(advisor_id));
    }
    let requests = query.all(db).await?;

    let mut advisor_ids: Vec<Uuid> = requests.iter().map(|r| r.advisor_id).collect();
    advisor_ids.sort();
    advisor_ids.dedup();
    let names: HashMap<Uuid, String> = if advisor_ids.is_empty() {
        HashMap::new()
    } else {
        Advisors::find()
            .filter(advisors::Column::Id.is_in(advisor_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|a| (a.id, a.name))
            .collect()
    };

    Ok(requests
        .into_iter()
        .map(|r| {
            let name = names.get(&r.advisor_id).cloned();
            MeetingRequestResponse::new(r, name)
        })
        .collect())
}

/// Move a request along pending → contacted → closed. Admins and the
/// addressed advisor may do this.
pub async fn update_status(
    db: &DatabaseConnection,
    user: &SessionContext,
    id: Uuid,
    next: MeetingStatus,
) -> Result<MeetingRequestResponse, ServiceError> {
    let request = MeetingRequests::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Meeting request".to_string()))?;
    let advisor = Advisors::find_by_id(request.advisor_id).one(db).await?;

    let is_owner = advisor
        .as_ref()
        .is_some_and(|a| a.user_id == Some(user.user_id));
    if !user.is_admin && !is_owner {
        return Err(ServiceError::Forbidden(
            "Only the advisor or an admin can update this request".to_string(),
        ));
    }

    let current = request.status;
    if !current.can_transition_to(next) {
        return Err(ServiceError::InvalidTransition {
            from: status_label(current).to_string(),
            to: status_label(next).to_string(),
        });
    }

    let mut active = request.into_active_model();
    active.status = Set(next);
    active.updated_at = Set(Utc::now().fixed_offset());
    let request = active.update(db).await?;

    info!(request_id = %id, from = status_label(current), to = status_label(next), "Meeting request status changed");
    Ok(MeetingRequestResponse::new(request, advisor.map(|a| a.name)))
}

fn status_label(status: MeetingStatus) -> &'static str {
    match status {
        MeetingStatus::Pending => "pending",
        MeetingStatus::Contacted => "contacted",
        MeetingStatus::Closed => "closed",
    }
}
