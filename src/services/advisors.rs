//! Advisor registration, self-service, moderation and directory queries

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::advisors::{self, AdvisorStatus};
use crate::entities::{investment_firms, prelude::*};
use crate::error::{FieldErrors, ServiceError};
use crate::models::advisor::{
    AdminAdvisorListQuery, AdminAdvisorListResponse, AdminUpdateAdvisorRequest, AdvisorFilters,
    AdvisorResponse, AdvisorSummary, FirmLink, OwnAdvisorResponse, RegisterAdvisorRequest,
    StatusCounts, UpdateAdvisorRequest,
};
use crate::models::listing::{non_blank, Page, Pagination};
use crate::services::auth::SessionContext;
use crate::services::listing::{amount_condition, contains_all, parse_amount, search_condition};
use crate::services::slug::unique_slug_avoiding;

/// Static segments under `/api/advisors/` that a slug must not shadow
pub const RESERVED_SLUGS: &[&str] = &["me", "register"];

fn advisor_not_found() -> ServiceError {
    ServiceError::NotFound("Advisor".to_string())
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn check_firm_exists(db: &DatabaseConnection, firm_id: Option<Uuid>) -> Result<(), ServiceError> {
    if let Some(firm_id) = firm_id {
        if InvestmentFirms::find_by_id(firm_id).one(db).await?.is_none() {
            let mut errors = FieldErrors::new();
            errors.add("firm_id", "Unknown investment firm");
            return Err(errors.into());
        }
    }
    Ok(())
}

async fn firm_link(db: &DatabaseConnection, firm_id: Option<Uuid>) -> Result<Option<FirmLink>, ServiceError> {
    let Some(firm_id) = firm_id else {
        return Ok(None);
    };
    let firm = InvestmentFirms::find_by_id(firm_id).one(db).await?;
    Ok(firm.map(|f: investment_firms::Model| FirmLink {
        id: f.id,
        name: f.name,
        slug: f.slug,
    }))
}

/// Create the caller's advisor record, pending approval unless saved as a draft.
pub async fn register(
    db: &DatabaseConnection,
    user: &SessionContext,
    req: RegisterAdvisorRequest,
) -> Result<AdvisorResponse, ServiceError> {
    // All field rules run before any query
    if let Err(errors) = req.validate() {
        warn!(user_id = %user.user_id, fields = %errors, "Advisor registration rejected");
        return Err(errors.into());
    }

    let existing = Advisors::find()
        .filter(advisors::Column::UserId.eq(user.user_id))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(ServiceError::Conflict(
            "You already have an advisor profile".to_string(),
        ));
    }
    check_firm_exists(db, req.firm_id).await?;

    let slug =
        unique_slug_avoiding::<Advisors>(db, advisors::Column::Slug, &req.name, RESERVED_SLUGS).await?;
    let status = if req.save_as_draft {
        AdvisorStatus::Draft
    } else {
        AdvisorStatus::PendingApproval
    };
    let minimum_investment = blank_to_none(req.minimum_investment);
    let now = Utc::now().fixed_offset();

    let advisor = advisors::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(Some(user.user_id)),
        firm_id: Set(req.firm_id),
        name: Set(req.name.trim().to_string()),
        slug: Set(slug),
        firm_name: Set(req.firm_name.trim().to_string()),
        position: Set(blank_to_none(req.position)),
        personal_bio: Set(req.personal_bio.trim().to_string()),
        firm_bio: Set(req.firm_bio.trim().to_string()),
        email: Set(req.email.trim().to_string()),
        phone: Set(blank_to_none(req.phone)),
        website: Set(blank_to_none(req.website)),
        city: Set(blank_to_none(req.city)),
        state: Set(blank_to_none(req.state)),
        years_of_experience: Set(req.years_of_experience.unwrap_or_default()),
        minimum_investment_amount: Set(minimum_investment.as_deref().and_then(parse_amount)),
        minimum_investment: Set(minimum_investment),
        services: Set(json!(req.services)),
        designations: Set(json!(req.designations)),
        licenses: Set(json!(req.licenses)),
        compensation_types: Set(json!(req.compensation_types)),
        client_types: Set(json!(req.client_types)),
        registered_states: Set(json!(req.registered_states)),
        headshot_url: Set(None),
        status: Set(status),
        approved_by: Set(None),
        approved_at: Set(None),
        rejection_reason: Set(None),
        verified: Set(false),
        premium: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    info!(advisor_id = %advisor.id, user_id = %user.user_id, status = %advisor.status, "Advisor registered");
    with_firm(db, advisor).await
}

fn apply_update(active: &mut advisors::ActiveModel, req: UpdateAdvisorRequest) {
    if let Some(name) = req.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(firm_name) = req.firm_name {
        active.firm_name = Set(firm_name.trim().to_string());
    }
    if let Some(firm_id) = req.firm_id {
        active.firm_id = Set(Some(firm_id));
    }
    if req.position.is_some() {
        active.position = Set(blank_to_none(req.position));
    }
    if let Some(bio) = req.personal_bio {
        active.personal_bio = Set(bio.trim().to_string());
    }
    if let Some(bio) = req.firm_bio {
        active.firm_bio = Set(bio.trim().to_string());
    }
    if let Some(email) = req.email {
        active.email = Set(email.trim().to_string());
    }
    if req.phone.is_some() {
        active.phone = Set(blank_to_none(req.phone));
    }
    if req.website.is_some() {
        active.website = Set(blank_to_none(req.website));
    }
    if req.city.is_some() {
        active.city = Set(blank_to_none(req.city));
    }
    if req.state.is_some() {
        active.state = Set(blank_to_none(req.state));
    }
    if let Some(years) = req.years_of_experience {
        active.years_of_experience = Set(years);
    }
    if req.minimum_investment.is_some() {
        let text = blank_to_none(req.minimum_investment);
        active.minimum_investment_amount = Set(text.as_deref().and_then(parse_amount));
        active.minimum_investment = Set(text);
    }
    if let Some(list) = req.services {
        active.services = Set(json!(list));
    }
    if let Some(list) = req.designations {
        active.designations = Set(json!(list));
    }
    if let Some(list) = req.licenses {
        active.licenses = Set(json!(list));
    }
    if let Some(list) = req.compensation_types {
        active.compensation_types = Set(json!(list));
    }
    if let Some(list) = req.client_types {
        active.client_types = Set(json!(list));
    }
    if let Some(list) = req.registered_states {
        active.registered_states = Set(json!(list));
    }
    active.updated_at = Set(Utc::now().fixed_offset());
}

async fn find_own(db: &DatabaseConnection, user_id: Uuid) -> Result<advisors::Model, ServiceError> {
    Advisors::find()
        .filter(advisors::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Advisor profile".to_string()))
}

/// The caller's record, provided it may still be edited.
pub async fn find_own_editable(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<advisors::Model, ServiceError> {
    let advisor = find_own(db, user_id).await?;
    if !advisor.status.is_owner_editable() {
        return Err(ServiceError::Forbidden(
            "Approved profiles can no longer be edited".to_string(),
        ));
    }
    Ok(advisor)
}

pub async fn get_own(db: &DatabaseConnection, user_id: Uuid) -> Result<OwnAdvisorResponse, ServiceError> {
    let advisor = find_own(db, user_id).await?;
    let firm = firm_link(db, advisor.firm_id).await?;
    let editable = advisor.status.is_owner_editable();
    Ok(OwnAdvisorResponse {
        advisor: AdvisorResponse::from_model(advisor, firm),
        editable,
    })
}

pub async fn update_own(
    db: &DatabaseConnection,
    user_id: Uuid,
    req: UpdateAdvisorRequest,
) -> Result<AdvisorResponse, ServiceError> {
    req.validate()?;
    let advisor = find_own_editable(db, user_id).await?;
    check_firm_exists(db, req.firm_id).await?;

    let mut active = advisor.into_active_model();
    apply_update(&mut active, req);
    let updated = active.update(db).await?;

    info!(advisor_id = %updated.id, "Advisor profile updated by owner");
    with_firm(db, updated).await
}

/// Move the caller's draft into the approval queue.
pub async fn submit_own(db: &DatabaseConnection, user_id: Uuid) -> Result<AdvisorResponse, ServiceError> {
    let advisor = find_own(db, user_id).await?;
    let updated = transition(db, advisor, AdvisorStatus::PendingApproval, |_| {}).await?;
    info!(advisor_id = %updated.id, "Advisor draft submitted for approval");
    with_firm(db, updated).await
}

pub async fn set_headshot(
    db: &DatabaseConnection,
    advisor: advisors::Model,
    url: String,
) -> Result<AdvisorResponse, ServiceError> {
    let mut active = advisor.into_active_model();
    active.headshot_url = Set(Some(url));
    active.updated_at = Set(Utc::now().fixed_offset());
    let updated = active.update(db).await?;
    with_firm(db, updated).await
}

/// Status change guarded on the status that was read, so two concurrent
/// moderation calls cannot both succeed.
async fn transition<F>(
    db: &DatabaseConnection,
    advisor: advisors::Model,
    next: AdvisorStatus,
    stamp: F,
) -> Result<advisors::Model, ServiceError>
where
    F: FnOnce(&mut advisors::ActiveModel),
{
    let from = advisor.status;
    if !from.can_transition_to(next) {
        warn!(advisor_id = %advisor.id, from = %from, to = %next, "Rejected status transition");
        return Err(ServiceError::InvalidTransition {
            from: from.to_string(),
            to: next.to_string(),
        });
    }

    let mut changes = advisors::ActiveModel {
        status: Set(next),
        updated_at: Set(Utc::now().fixed_offset()),
        ..Default::default()
    };
    stamp(&mut changes);

    let mut updated = Advisors::update_many()
        .set(changes)
        .filter(advisors::Column::Id.eq(advisor.id))
        .filter(advisors::Column::Status.eq(from))
        .exec_with_returning(db)
        .await?;
    match updated.pop() {
        Some(model) => Ok(model),
        None => {
            let current = find_by_id(db, advisor.id).await?;
            warn!(advisor_id = %advisor.id, from = %current.status, to = %next, "Status changed concurrently");
            Err(ServiceError::InvalidTransition {
                from: current.status.to_string(),
                to: next.to_string(),
            })
        }
    }
}

/// Response with the linked firm resolved.
async fn with_firm(db: &DatabaseConnection, advisor: advisors::Model) -> Result<AdvisorResponse, ServiceError> {
    let firm = firm_link(db, advisor.firm_id).await?;
    Ok(AdvisorResponse::from_model(advisor, firm))
}

async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> Result<advisors::Model, ServiceError> {
    Advisors::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(advisor_not_found)
}

pub async fn approve(
    db: &DatabaseConnection,
    admin: &SessionContext,
    id: Uuid,
) -> Result<AdvisorResponse, ServiceError> {
    let advisor = find_by_id(db, id).await?;
    let admin_id = admin.user_id;
    let updated = transition(db, advisor, AdvisorStatus::Approved, |active| {
        active.approved_by = Set(Some(admin_id));
        active.approved_at = Set(Some(Utc::now().fixed_offset()));
        active.rejection_reason = Set(None);
        active.verified = Set(true);
    })
    .await?;

    info!(advisor_id = %updated.id, admin_id = %admin_id, "Advisor approved");
    with_firm(db, updated).await
}

pub async fn reject(
    db: &DatabaseConnection,
    admin: &SessionContext,
    id: Uuid,
    reason: String,
) -> Result<AdvisorResponse, ServiceError> {
    let advisor = find_by_id(db, id).await?;
    let admin_id = admin.user_id;
    let updated = transition(db, advisor, AdvisorStatus::Rejected, |active| {
        active.approved_by = Set(Some(admin_id));
        active.approved_at = Set(Some(Utc::now().fixed_offset()));
        active.rejection_reason = Set(Some(reason));
    })
    .await?;

    info!(advisor_id = %updated.id, admin_id = %admin_id, "Advisor rejected");
    with_firm(db, updated).await
}

pub async fn admin_update(
    db: &DatabaseConnection,
    id: Uuid,
    req: AdminUpdateAdvisorRequest,
) -> Result<AdvisorResponse, ServiceError> {
    req.profile.validate()?;
    let advisor = find_by_id(db, id).await?;
    check_firm_exists(db, req.profile.firm_id).await?;

    let mut active = advisor.into_active_model();
    apply_update(&mut active, req.profile);
    if let Some(verified) = req.verified {
        active.verified = Set(verified);
    }
    if let Some(premium) = req.premium {
        active.premium = Set(premium);
    }
    let updated = active.update(db).await?;

    info!(advisor_id = %updated.id, "Advisor updated by admin");
    with_firm(db, updated).await
}

/// Hard delete; meeting requests cascade.
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let result = Advisors::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(advisor_not_found());
    }
    info!(advisor_id = %id, "Advisor deleted");
    Ok(())
}

pub async fn admin_list(
    db: &DatabaseConnection,
    query: &AdminAdvisorListQuery,
) -> Result<AdminAdvisorListResponse, ServiceError> {
    let mut errors = FieldErrors::new();
    let pagination = Pagination::from_query(query.page, query.per_page, &mut errors);
    errors.into_result()?;

    let mut counts = StatusCounts::default();
    for status in [
        AdvisorStatus::Draft,
        AdvisorStatus::PendingApproval,
        AdvisorStatus::Approved,
        AdvisorStatus::Rejected,
    ] {
        let n = Advisors::find()
            .filter(advisors::Column::Status.eq(status))
            .count(db)
            .await?;
        match status {
            AdvisorStatus::Draft => counts.draft = n,
            AdvisorStatus::PendingApproval => counts.pending_approval = n,
            AdvisorStatus::Approved => counts.approved = n,
            AdvisorStatus::Rejected => counts.rejected = n,
        }
    }

    let mut select = Advisors::find();
    if let Some(status) = query.status {
        select = select.filter(advisors::Column::Status.eq(status));
    }
    if let Some(search) = non_blank(query.search.as_deref()) {
        select = select.filter(search_condition(
            &[advisors::Column::Name, advisors::Column::FirmName, advisors::Column::Email],
            &search,
        ));
    }

    let total = select.clone().count(db).await?;
    let rows = select
        .order_by_desc(advisors::Column::CreatedAt)
        .offset(pagination.offset())
        .limit(pagination.per_page)
        .all(db)
        .await?;

    let items = rows
        .into_iter()
        .map(|row| AdvisorResponse::from_model(row, None))
        .collect();
    Ok(AdminAdvisorListResponse {
        advisors: Page::new(items, total, pagination),
        counts,
    })
}

/// Public directory page: approved advisors only.
pub async fn list_public(
    db: &DatabaseConnection,
    filters: &AdvisorFilters,
) -> Result<Page<AdvisorSummary>, ServiceError> {
    let mut condition = Condition::all().add(advisors::Column::Status.eq(AdvisorStatus::Approved));

    if let Some(search) = &filters.search {
        condition = condition.add(search_condition(
            &[advisors::Column::Name, advisors::Column::FirmName, advisors::Column::City],
            search,
        ));
    }
    if let Some(state) = &filters.state {
        condition = condition.add(advisors::Column::State.eq(state.as_str()));
    }
    if let Some(client_type) = &filters.client_type {
        condition = condition.add(contains_all(
            advisors::Column::ClientTypes,
            std::slice::from_ref(client_type),
        ));
    }
    if !filters.specialties.is_empty() {
        condition = condition.add(contains_all(advisors::Column::Services, &filters.specialties));
    }
    if let Some(bucket) = filters.min_assets {
        condition = condition.add(amount_condition(
            advisors::Column::MinimumInvestmentAmount,
            bucket.range(),
        ));
    }

    let select = Advisors::find().filter(condition);
    let total = select.clone().count(db).await?;
    let rows = select
        .order_by_desc(advisors::Column::Premium)
        .order_by_desc(advisors::Column::Verified)
        .order_by_asc(advisors::Column::Name)
        .offset(filters.pagination.offset())
        .limit(filters.pagination.per_page)
        .all(db)
        .await?;

    let items = rows.iter().map(AdvisorSummary::from).collect();
    Ok(Page::new(items, total, filters.pagination))
}

/// Detail page. Unapproved records are visible only to their owner and admins.
pub async fn get_by_slug(
    db: &DatabaseConnection,
    slug: &str,
    viewer: Option<&SessionContext>,
) -> Result<AdvisorResponse, ServiceError> {
    let advisor = Advisors::find()
        .filter(advisors::Column::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or_else(advisor_not_found)?;

    let privileged = viewer.is_some_and(|v| v.is_admin || advisor.user_id == Some(v.user_id));
    if advisor.status != AdvisorStatus::Approved && !privileged {
        return Err(advisor_not_found());
    }

    let firm = firm_link(db, advisor.firm_id).await?;
    let response = AdvisorResponse::from_model(advisor, firm);
    Ok(if privileged {
        response
    } else {
        response.without_moderation()
    })
}

/// Approved advisor targeted by a meeting request.
pub async fn find_approved(db: &DatabaseConnection, id: Uuid) -> Result<advisors::Model, ServiceError> {
    Advisors::find_by_id(id)
        .one(db)
        .await?
        .filter(|a| a.status == AdvisorStatus::Approved)
        .ok_or_else(advisor_not_found)
}

/// Owner lookup used by meeting-request views.
pub async fn find_for_user(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<advisors::Model, ServiceError> {
    find_own(db, user_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn advisor(status: AdvisorStatus, user_id: Option<Uuid>) -> advisors::Model {
        let now = Utc::now().fixed_offset();
        advisors::Model {
            id: Uuid::new_v4(),
            user_id,
            firm_id: None,
            name: "Jane Doe".to_string(),
            slug: "jane-doe".to_string(),
            firm_name: "Lone Star Wealth".to_string(),
            position: None,
            personal_bio: "Twenty years helping Texas families retire well.".to_string(),
            firm_bio: "Independent fee-only planning firm.".to_string(),
            email: "jane@example.com".to_string(),
            phone: None,
            website: None,
            city: Some("Austin".to_string()),
            state: Some("Texas".to_string()),
            years_of_experience: 20,
            minimum_investment: Some("$250k".to_string()),
            minimum_investment_amount: Some(250_000),
            services: json!(["Retirement Planning"]),
            designations: json!(["CFP"]),
            licenses: json!([]),
            compensation_types: json!(["Fee-Only"]),
            client_types: json!(["Retirees"]),
            registered_states: json!(["Texas"]),
            headshot_url: None,
            status,
            approved_by: None,
            approved_at: None,
            rejection_reason: None,
            verified: false,
            premium: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn admin() -> SessionContext {
        SessionContext {
            user_id: Uuid::new_v4(),
            email: "admin@example.com".to_string(),
            is_admin: true,
            expires_at: Utc::now().fixed_offset() + chrono::Duration::hours(1),
        }
    }

    #[tokio::test]
    async fn test_short_bio_rejected_before_any_query() {
        // No query results queued: any database call would fail the test
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let req = RegisterAdvisorRequest {
            personal_bio: "Too short".to_string(),
            ..Default::default()
        };
        let user = SessionContext { is_admin: false, ..admin() };

        let err = register(&db, &user, req).await.unwrap_err();
        match err {
            ServiceError::Validation(fields) => {
                assert_eq!(fields.get("personal_bio"), Some("Bio must be at least 10 characters"))
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn test_approve_pending_sets_metadata() {
        let pending = advisor(AdvisorStatus::PendingApproval, None);
        let reviewer = admin();
        let mut approved = pending.clone();
        approved.status = AdvisorStatus::Approved;
        approved.approved_by = Some(reviewer.user_id);
        approved.approved_at = Some(Utc::now().fixed_offset());
        approved.verified = true;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![pending.clone()]])
            .append_query_results([vec![approved]])
            .into_connection();

        let res = approve(&db, &reviewer, pending.id).await.unwrap();
        assert_eq!(res.status, AdvisorStatus::Approved);
        assert_eq!(res.approved_by, Some(reviewer.user_id));
        assert!(res.verified);
    }

    #[tokio::test]
    async fn test_reject_approved_is_invalid_transition() {
        let approved = advisor(AdvisorStatus::Approved, None);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![approved.clone()]])
            .into_connection();

        let err = reject(&db, &admin(), approved.id, "Incomplete".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_owner_cannot_edit_approved_profile() {
        let owner = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![advisor(AdvisorStatus::Approved, Some(owner))]])
            .into_connection();

        let req = UpdateAdvisorRequest {
            city: Some("Dallas".to_string()),
            ..Default::default()
        };
        let err = update_own(&db, owner, req).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_pending_profile_hidden_from_public() {
        let owner = Uuid::new_v4();
        let pending = advisor(AdvisorStatus::PendingApproval, Some(owner));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![pending.clone()]])
            .append_query_results([vec![pending]])
            .into_connection();

        let err = get_by_slug(&db, "jane-doe", None).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let viewer = SessionContext {
            user_id: owner,
            is_admin: false,
            ..admin()
        };
        let res = get_by_slug(&db, "jane-doe", Some(&viewer)).await.unwrap();
        assert_eq!(res.status, AdvisorStatus::PendingApproval);
    }

    #[tokio::test]
    async fn test_delete_missing_advisor() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let err = delete(&db, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    fn firm(id: Uuid) -> investment_firms::Model {
        let now = Utc::now().fixed_offset();
        investment_firms::Model {
            id,
            name: "Lone Star Wealth".to_string(),
            slug: "lone-star-wealth".to_string(),
            headquarters: Some("Austin, TX".to_string()),
            state: Some("Texas".to_string()),
            description: None,
            website: None,
            founded_year: Some(2004),
            aum: Some("$1.2B".to_string()),
            fee_structure: None,
            minimum_investment: Some("$250k".to_string()),
            minimum_investment_amount: Some(250_000),
            asset_classes: json!(["Equities"]),
            client_types: json!(["Retirees"]),
            verified: true,
            premium: false,
            rating: None,
            review_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        std::collections::BTreeMap::from([("num_items", sea_orm::Value::from(n))])
    }

    #[tokio::test]
    async fn test_register_avoids_route_slugs() {
        let user = SessionContext { is_admin: false, ..admin() };
        let mut created = advisor(AdvisorStatus::PendingApproval, Some(user.user_id));
        created.name = "Me".to_string();
        created.slug = "me-2".to_string();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<advisors::Model>::new()])
            .append_query_results([Vec::<advisors::Model>::new()])
            .append_query_results([vec![created]])
            .into_connection();

        let req = RegisterAdvisorRequest {
            name: "Me".to_string(),
            firm_name: "Lone Star Wealth".to_string(),
            personal_bio: "Twenty years helping Texas families retire well.".to_string(),
            firm_bio: "Independent fee-only planning firm.".to_string(),
            email: "me@example.com".to_string(),
            years_of_experience: Some(20),
            services: vec!["Retirement Planning".to_string()],
            client_types: vec!["Retirees".to_string()],
            terms_accepted: true,
            ..Default::default()
        };
        let res = register(&db, &user, req).await.unwrap();
        assert_eq!(res.slug, "me-2");

        let log = db.into_transaction_log();
        let insert = &log[2].statements()[0];
        assert!(insert.sql.starts_with(r#"INSERT INTO "advisors""#));
        let values = &insert.values.as_ref().expect("bound values").0;
        assert!(values.contains(&sea_orm::Value::from("me-2".to_string())));
    }

    #[tokio::test]
    async fn test_concurrent_moderation_loses() {
        let pending = advisor(AdvisorStatus::PendingApproval, None);
        let mut approved = pending.clone();
        approved.status = AdvisorStatus::Approved;

        // Read as pending, but the guarded update matches no row
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![pending.clone()]])
            .append_query_results([Vec::<advisors::Model>::new()])
            .append_query_results([vec![approved]])
            .into_connection();

        let err = reject(&db, &admin(), pending.id, "Incomplete".to_string())
            .await
            .unwrap_err();
        match err {
            ServiceError::InvalidTransition { from, to } => {
                assert_eq!(from, AdvisorStatus::Approved.to_string());
                assert_eq!(to, AdvisorStatus::Rejected.to_string());
            }
            other => panic!("expected invalid transition, got {other:?}"),
        }

        let log = db.into_transaction_log();
        let update = &log[1].statements()[0].sql;
        assert!(update.starts_with(r#"UPDATE "advisors""#));
        assert!(update.contains(r#""advisors"."status" = $"#));
    }

    #[tokio::test]
    async fn test_approve_includes_firm_link() {
        let firm_id = Uuid::new_v4();
        let mut pending = advisor(AdvisorStatus::PendingApproval, None);
        pending.firm_id = Some(firm_id);
        let mut approved = pending.clone();
        approved.status = AdvisorStatus::Approved;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![pending.clone()]])
            .append_query_results([vec![approved]])
            .append_query_results([vec![firm(firm_id)]])
            .into_connection();

        let res = approve(&db, &admin(), pending.id).await.unwrap();
        let link = res.firm.expect("firm link");
        assert_eq!(link.id, firm_id);
        assert_eq!(link.slug, "lone-star-wealth");
    }

    #[tokio::test]
    async fn test_unfiltered_directory_query() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row(0)]])
            .append_query_results([Vec::<advisors::Model>::new()])
            .into_connection();

        let page = list_public(&db, &AdvisorFilters::default()).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.page, 1);

        let log = db.into_transaction_log();
        let stmt = &log[1].statements()[0];
        assert!(stmt.sql.contains(r#"WHERE "advisors"."status" = $1 ORDER BY"#));
        assert!(stmt.sql.ends_with("LIMIT $2 OFFSET $3"));
        let values = &stmt.values.as_ref().expect("bound values").0;
        assert_eq!(values.len(), 3);
        assert_eq!(values[1], sea_orm::Value::BigUnsigned(Some(12)));
        assert_eq!(values[2], sea_orm::Value::BigUnsigned(Some(0)));
    }

    #[tokio::test]
    async fn test_directory_filters_reach_query() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row(1)]])
            .append_query_results([vec![advisor(AdvisorStatus::Approved, None)]])
            .into_connection();

        let filters = AdvisorFilters {
            state: Some("Texas".to_string()),
            client_type: Some("Retirees".to_string()),
            specialties: vec!["Retirement Planning".to_string()],
            min_assets: Some(crate::models::listing::AssetBucket::From100kTo500k),
            ..Default::default()
        };
        let page = list_public(&db, &filters).await.unwrap();
        assert_eq!(page.total, 1);

        let log = db.into_transaction_log();
        let stmt = &log[1].statements()[0];
        assert!(stmt.sql.contains(r#""advisors"."state" = $"#));
        assert!(stmt.sql.contains(r#""client_types" @> $"#));
        assert!(stmt.sql.contains(r#""services" @> $"#));
        assert!(stmt.sql.contains(r#""advisors"."minimum_investment_amount" >= $"#));
        assert!(stmt.sql.contains(r#""advisors"."minimum_investment_amount" < $"#));

        let values = &stmt.values.as_ref().expect("bound values").0;
        assert!(values.contains(&sea_orm::Value::from(json!(["Retirement Planning"]))));
        assert!(values.contains(&sea_orm::Value::BigInt(Some(100_000))));
        assert!(values.contains(&sea_orm::Value::BigInt(Some(500_000))));
    }
}
