//! Investment and accounting firm directories and their admin CRUD
//!
//! Both firm kinds share the child tables (leaders, features, registrations,
//! similar firms), discriminated by [`FirmKind`].

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::entities::firm_kind::FirmKind;
use crate::entities::{
    accounting_firms, firm_features, firm_leaders, firm_registrations, investment_firms,
    prelude::*, similar_firms,
};
use crate::error::{FieldErrors, ServiceError};
use crate::models::firm::{
    AccountingFirmDetail, AccountingFirmFilters, AccountingFirmInput, AccountingFirmSummary,
    FirmChildren, FirmChildrenInput, FirmCommonInput, InvestmentFirmDetail, InvestmentFirmFilters,
    InvestmentFirmInput, InvestmentFirmSummary, SimilarFirmLink,
};
use crate::models::listing::Page;
use crate::services::listing::{amount_condition, contains_all, parse_amount, search_condition};
use crate::services::slug::unique_slug;

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn not_found(kind: FirmKind) -> ServiceError {
    match kind {
        FirmKind::Investment => ServiceError::NotFound("Investment firm".to_string()),
        FirmKind::Accounting => ServiceError::NotFound("Accounting firm".to_string()),
    }
}

async fn load_children<C: ConnectionTrait>(
    db: &C,
    kind: FirmKind,
    firm_id: Uuid,
) -> Result<FirmChildren, ServiceError> {
    let (leaders, features, registrations, similar) = futures_util::try_join!(
        FirmLeaders::find()
            .filter(firm_leaders::Column::FirmKind.eq(kind))
            .filter(firm_leaders::Column::FirmId.eq(firm_id))
            .order_by_asc(firm_leaders::Column::Position)
            .all(db),
        FirmFeatures::find()
            .filter(firm_features::Column::FirmKind.eq(kind))
            .filter(firm_features::Column::FirmId.eq(firm_id))
            .order_by_asc(firm_features::Column::Position)
            .all(db),
        FirmRegistrations::find()
            .filter(firm_registrations::Column::FirmKind.eq(kind))
            .filter(firm_registrations::Column::FirmId.eq(firm_id))
            .order_by_asc(firm_registrations::Column::Id)
            .all(db),
        SimilarFirms::find()
            .filter(similar_firms::Column::FirmKind.eq(kind))
            .filter(similar_firms::Column::FirmId.eq(firm_id))
            .order_by_asc(similar_firms::Column::Id)
            .all(db),
    )?;

    let similar_ids: Vec<Uuid> = similar.iter().map(|s| s.similar_firm_id).collect();
    let similar_firms = similar_links(db, kind, &similar_ids).await?;

    Ok(FirmChildren::new(leaders, features, registrations, similar_firms))
}

async fn similar_links<C: ConnectionTrait>(
    db: &C,
    kind: FirmKind,
    ids: &[Uuid],
) -> Result<Vec<SimilarFirmLink>, ServiceError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let links = match kind {
        FirmKind::Investment => InvestmentFirms::find()
            .filter(investment_firms::Column::Id.is_in(ids.to_vec()))
            .order_by_asc(investment_firms::Column::Name)
            .all(db)
            .await?
            .into_iter()
            .map(|f| SimilarFirmLink {
                id: f.id,
                name: f.name,
                slug: f.slug,
            })
            .collect(),
        FirmKind::Accounting => AccountingFirms::find()
            .filter(accounting_firms::Column::Id.is_in(ids.to_vec()))
            .order_by_asc(accounting_firms::Column::Name)
            .all(db)
            .await?
            .into_iter()
            .map(|f| SimilarFirmLink {
                id: f.id,
                name: f.name,
                slug: f.slug,
            })
            .collect(),
    };
    Ok(links)
}

/// Every similar-firm id must name another firm of the same kind.
async fn check_similar_ids(
    db: &DatabaseConnection,
    kind: FirmKind,
    firm_id: Option<Uuid>,
    children: &FirmChildrenInput,
) -> Result<(), ServiceError> {
    let Some(ids) = &children.similar_firm_ids else {
        return Ok(());
    };
    let mut errors = FieldErrors::new();
    if firm_id.is_some_and(|id| ids.contains(&id)) {
        errors.add("similar_firm_ids", "A firm cannot be similar to itself");
    }
    let mut unique = ids.clone();
    unique.sort();
    unique.dedup();
    if !unique.is_empty() {
        let found = match kind {
            FirmKind::Investment => {
                InvestmentFirms::find()
                    .filter(investment_firms::Column::Id.is_in(unique.clone()))
                    .count(db)
                    .await?
            }
            FirmKind::Accounting => {
                AccountingFirms::find()
                    .filter(accounting_firms::Column::Id.is_in(unique.clone()))
                    .count(db)
                    .await?
            }
        };
        if found != unique.len() as u64 {
            errors.add("similar_firm_ids", "Unknown firm in similar firms");
        }
    }
    errors.into_result()?;
    Ok(())
}

/// Replace each child collection present in `children`.
async fn replace_children(
    txn: &DatabaseTransaction,
    kind: FirmKind,
    firm_id: Uuid,
    children: FirmChildrenInput,
) -> Result<(), ServiceError> {
    if let Some(leaders) = children.leaders {
        FirmLeaders::delete_many()
            .filter(firm_leaders::Column::FirmKind.eq(kind))
            .filter(firm_leaders::Column::FirmId.eq(firm_id))
            .exec(txn)
            .await?;
        if !leaders.is_empty() {
            let rows = leaders.into_iter().enumerate().map(|(i, l)| firm_leaders::ActiveModel {
                firm_kind: Set(kind),
                firm_id: Set(firm_id),
                name: Set(l.name.trim().to_string()),
                title: Set(l.title.trim().to_string()),
                bio: Set(blank_to_none(l.bio)),
                position: Set(i as i32),
                ..Default::default()
            });
            FirmLeaders::insert_many(rows).exec_without_returning(txn).await?;
        }
    }

    if let Some(features) = children.features {
        FirmFeatures::delete_many()
            .filter(firm_features::Column::FirmKind.eq(kind))
            .filter(firm_features::Column::FirmId.eq(firm_id))
            .exec(txn)
            .await?;
        if !features.is_empty() {
            let rows = features.into_iter().enumerate().map(|(i, label)| firm_features::ActiveModel {
                firm_kind: Set(kind),
                firm_id: Set(firm_id),
                label: Set(label.trim().to_string()),
                position: Set(i as i32),
                ..Default::default()
            });
            FirmFeatures::insert_many(rows).exec_without_returning(txn).await?;
        }
    }

    if let Some(registrations) = children.registrations {
        FirmRegistrations::delete_many()
            .filter(firm_registrations::Column::FirmKind.eq(kind))
            .filter(firm_registrations::Column::FirmId.eq(firm_id))
            .exec(txn)
            .await?;
        if !registrations.is_empty() {
            let rows = registrations.into_iter().map(|r| firm_registrations::ActiveModel {
                firm_kind: Set(kind),
                firm_id: Set(firm_id),
                regulator: Set(r.regulator.trim().to_string()),
                registration_number: Set(blank_to_none(r.registration_number)),
                ..Default::default()
            });
            FirmRegistrations::insert_many(rows).exec_without_returning(txn).await?;
        }
    }

    if let Some(mut ids) = children.similar_firm_ids {
        SimilarFirms::delete_many()
            .filter(similar_firms::Column::FirmKind.eq(kind))
            .filter(similar_firms::Column::FirmId.eq(firm_id))
            .exec(txn)
            .await?;
        ids.sort();
        ids.dedup();
        if !ids.is_empty() {
            let rows = ids.into_iter().map(|similar_id| similar_firms::ActiveModel {
                firm_kind: Set(kind),
                firm_id: Set(firm_id),
                similar_firm_id: Set(similar_id),
                ..Default::default()
            });
            SimilarFirms::insert_many(rows).exec_without_returning(txn).await?;
        }
    }
    Ok(())
}

/// Remove a firm's child rows and any similar-firm links pointing at it.
async fn delete_children(txn: &DatabaseTransaction, kind: FirmKind, firm_id: Uuid) -> Result<(), ServiceError> {
    FirmLeaders::delete_many()
        .filter(firm_leaders::Column::FirmKind.eq(kind))
        .filter(firm_leaders::Column::FirmId.eq(firm_id))
        .exec(txn)
        .await?;
    FirmFeatures::delete_many()
        .filter(firm_features::Column::FirmKind.eq(kind))
        .filter(firm_features::Column::FirmId.eq(firm_id))
        .exec(txn)
        .await?;
    FirmRegistrations::delete_many()
        .filter(firm_registrations::Column::FirmKind.eq(kind))
        .filter(firm_registrations::Column::FirmId.eq(firm_id))
        .exec(txn)
        .await?;
    SimilarFirms::delete_many()
        .filter(similar_firms::Column::FirmKind.eq(kind))
        .filter(
            Condition::any()
                .add(similar_firms::Column::FirmId.eq(firm_id))
                .add(similar_firms::Column::SimilarFirmId.eq(firm_id)),
        )
        .exec(txn)
        .await?;
    Ok(())
}

// Investment firms

pub async fn list_investment(
    db: &DatabaseConnection,
    filters: &InvestmentFirmFilters,
) -> Result<Page<InvestmentFirmSummary>, ServiceError> {
    let mut condition = Condition::all();
    if let Some(search) = &filters.search {
        condition = condition.add(search_condition(
            &[investment_firms::Column::Name, investment_firms::Column::Headquarters],
            search,
        ));
    }
    if let Some(state) = &filters.state {
        condition = condition.add(investment_firms::Column::State.eq(state.as_str()));
    }
    if let Some(client_type) = &filters.client_type {
        condition = condition.add(contains_all(
            investment_firms::Column::ClientTypes,
            std::slice::from_ref(client_type),
        ));
    }
    if !filters.asset_classes.is_empty() {
        condition = condition.add(contains_all(investment_firms::Column::AssetClasses, &filters.asset_classes));
    }
    if let Some(bucket) = filters.min_assets {
        condition = condition.add(amount_condition(
            investment_firms::Column::MinimumInvestmentAmount,
            bucket.range(),
        ));
    }

    let select = InvestmentFirms::find().filter(condition);
    let total = select.clone().count(db).await?;
    let rows = select
        .order_by_desc(investment_firms::Column::Premium)
        .order_by_desc(investment_firms::Column::Verified)
        .order_by_asc(investment_firms::Column::Name)
        .offset(filters.pagination.offset())
        .limit(filters.pagination.per_page)
        .all(db)
        .await?;

    let items = rows.iter().map(InvestmentFirmSummary::from).collect();
    Ok(Page::new(items, total, filters.pagination))
}

pub async fn investment_by_slug(
    db: &DatabaseConnection,
    slug: &str,
) -> Result<InvestmentFirmDetail, ServiceError> {
    let firm = InvestmentFirms::find()
        .filter(investment_firms::Column::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or_else(|| not_found(FirmKind::Investment))?;
    let children = load_children(db, FirmKind::Investment, firm.id).await?;
    Ok(InvestmentFirmDetail::new(firm, children))
}

async fn investment_detail_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<InvestmentFirmDetail, ServiceError> {
    let firm = InvestmentFirms::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| not_found(FirmKind::Investment))?;
    let children = load_children(db, FirmKind::Investment, firm.id).await?;
    Ok(InvestmentFirmDetail::new(firm, children))
}

fn apply_investment(active: &mut investment_firms::ActiveModel, common: FirmCommonInput, aum: Option<String>, minimum: Option<String>, asset_classes: Option<Vec<String>>) {
    if let Some(name) = common.name {
        active.name = Set(name.trim().to_string());
    }
    if common.headquarters.is_some() {
        active.headquarters = Set(blank_to_none(common.headquarters));
    }
    if common.state.is_some() {
        active.state = Set(blank_to_none(common.state));
    }
    if common.description.is_some() {
        active.description = Set(blank_to_none(common.description));
    }
    if common.website.is_some() {
        active.website = Set(blank_to_none(common.website));
    }
    if common.founded_year.is_some() {
        active.founded_year = Set(common.founded_year);
    }
    if common.fee_structure.is_some() {
        active.fee_structure = Set(blank_to_none(common.fee_structure));
    }
    if let Some(types) = common.client_types {
        active.client_types = Set(json!(types));
    }
    if let Some(verified) = common.verified {
        active.verified = Set(verified);
    }
    if let Some(premium) = common.premium {
        active.premium = Set(premium);
    }
    if common.rating.is_some() {
        active.rating = Set(common.rating);
    }
    if let Some(count) = common.review_count {
        active.review_count = Set(count);
    }
    if aum.is_some() {
        active.aum = Set(blank_to_none(aum));
    }
    if minimum.is_some() {
        let text = blank_to_none(minimum);
        active.minimum_investment_amount = Set(text.as_deref().and_then(parse_amount));
        active.minimum_investment = Set(text);
    }
    if let Some(classes) = asset_classes {
        active.asset_classes = Set(json!(classes));
    }
}

pub async fn create_investment(
    db: &DatabaseConnection,
    input: InvestmentFirmInput,
) -> Result<InvestmentFirmDetail, ServiceError> {
    input.validate(true)?;
    check_similar_ids(db, FirmKind::Investment, None, &input.children).await?;

    let name = input.common.name.clone().unwrap_or_default();
    let slug = unique_slug::<InvestmentFirms>(db, investment_firms::Column::Slug, &name).await?;
    let now = Utc::now().fixed_offset();
    let id = Uuid::new_v4();

    let mut active = investment_firms::ActiveModel {
        id: Set(id),
        name: Set(String::new()),
        slug: Set(slug),
        headquarters: Set(None),
        state: Set(None),
        description: Set(None),
        website: Set(None),
        founded_year: Set(None),
        aum: Set(None),
        fee_structure: Set(None),
        minimum_investment: Set(None),
        minimum_investment_amount: Set(None),
        asset_classes: Set(json!([])),
        client_types: Set(json!([])),
        verified: Set(false),
        premium: Set(false),
        rating: Set(None),
        review_count: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
    };
    apply_investment(&mut active, input.common, input.aum, input.minimum_investment, input.asset_classes);

    let txn = db.begin().await?;
    active.insert(&txn).await?;
    replace_children(&txn, FirmKind::Investment, id, input.children).await?;
    let detail = investment_detail_by_id(&txn, id).await?;
    txn.commit().await?;

    info!(firm_id = %id, slug = %detail.summary.slug, "Investment firm created");
    Ok(detail)
}

pub async fn update_investment(
    db: &DatabaseConnection,
    id: Uuid,
    input: InvestmentFirmInput,
) -> Result<InvestmentFirmDetail, ServiceError> {
    input.validate(false)?;
    let firm = InvestmentFirms::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| not_found(FirmKind::Investment))?;
    check_similar_ids(db, FirmKind::Investment, Some(id), &input.children).await?;

    let mut active = firm.into_active_model();
    apply_investment(&mut active, input.common, input.aum, input.minimum_investment, input.asset_classes);
    active.updated_at = Set(Utc::now().fixed_offset());

    let txn = db.begin().await?;
    active.update(&txn).await?;
    replace_children(&txn, FirmKind::Investment, id, input.children).await?;
    let detail = investment_detail_by_id(&txn, id).await?;
    txn.commit().await?;

    info!(firm_id = %id, "Investment firm updated");
    Ok(detail)
}

pub async fn delete_investment(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let txn = db.begin().await?;
    delete_children(&txn, FirmKind::Investment, id).await?;
    let result = InvestmentFirms::delete_by_id(id).exec(&txn).await?;
    if result.rows_affected == 0 {
        txn.rollback().await?;
        return Err(not_found(FirmKind::Investment));
    }
    txn.commit().await?;
    info!(firm_id = %id, "Investment firm deleted");
    Ok(())
}

// Accounting firms

pub async fn list_accounting(
    db: &DatabaseConnection,
    filters: &AccountingFirmFilters,
) -> Result<Page<AccountingFirmSummary>, ServiceError> {
    let mut condition = Condition::all();
    if let Some(search) = &filters.search {
        condition = condition.add(search_condition(
            &[accounting_firms::Column::Name, accounting_firms::Column::Headquarters],
            search,
        ));
    }
    if let Some(state) = &filters.state {
        condition = condition.add(accounting_firms::Column::State.eq(state.as_str()));
    }
    if let Some(client_type) = &filters.client_type {
        condition = condition.add(contains_all(
            accounting_firms::Column::ClientTypes,
            std::slice::from_ref(client_type),
        ));
    }
    if !filters.services.is_empty() {
        condition = condition.add(contains_all(accounting_firms::Column::Services, &filters.services));
    }
    if let Some(bucket) = filters.min_fee {
        condition = condition.add(amount_condition(
            accounting_firms::Column::MinimumFeeAmount,
            bucket.range(),
        ));
    }

    let select = AccountingFirms::find().filter(condition);
    let total = select.clone().count(db).await?;
    let rows = select
        .order_by_desc(accounting_firms::Column::Premium)
        .order_by_desc(accounting_firms::Column::Verified)
        .order_by_asc(accounting_firms::Column::Name)
        .offset(filters.pagination.offset())
        .limit(filters.pagination.per_page)
        .all(db)
        .await?;

    let items = rows.iter().map(AccountingFirmSummary::from).collect();
    Ok(Page::new(items, total, filters.pagination))
}

pub async fn accounting_by_slug(
    db: &DatabaseConnection,
    slug: &str,
) -> Result<AccountingFirmDetail, ServiceError> {
    let firm = AccountingFirms::find()
        .filter(accounting_firms::Column::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or_else(|| not_found(FirmKind::Accounting))?;
    let children = load_children(db, FirmKind::Accounting, firm.id).await?;
    Ok(AccountingFirmDetail::new(firm, children))
}

async fn accounting_detail_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<AccountingFirmDetail, ServiceError> {
    let firm = AccountingFirms::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| not_found(FirmKind::Accounting))?;
    let children = load_children(db, FirmKind::Accounting, firm.id).await?;
    Ok(AccountingFirmDetail::new(firm, children))
}

fn apply_accounting(active: &mut accounting_firms::ActiveModel, common: FirmCommonInput, minimum_fee: Option<String>, services: Option<Vec<String>>) {
    if let Some(name) = common.name {
        active.name = Set(name.trim().to_string());
    }
    if common.headquarters.is_some() {
        active.headquarters = Set(blank_to_none(common.headquarters));
    }
    if common.state.is_some() {
        active.state = Set(blank_to_none(common.state));
    }
    if common.description.is_some() {
        active.description = Set(blank_to_none(common.description));
    }
    if common.website.is_some() {
        active.website = Set(blank_to_none(common.website));
    }
    if common.founded_year.is_some() {
        active.founded_year = Set(common.founded_year);
    }
    if common.fee_structure.is_some() {
        active.fee_structure = Set(blank_to_none(common.fee_structure));
    }
    if let Some(types) = common.client_types {
        active.client_types = Set(json!(types));
    }
    if let Some(verified) = common.verified {
        active.verified = Set(verified);
    }
    if let Some(premium) = common.premium {
        active.premium = Set(premium);
    }
    if common.rating.is_some() {
        active.rating = Set(common.rating);
    }
    if let Some(count) = common.review_count {
        active.review_count = Set(count);
    }
    if minimum_fee.is_some() {
        let text = blank_to_none(minimum_fee);
        active.minimum_fee_amount = Set(text.as_deref().and_then(parse_amount));
        active.minimum_fee = Set(text);
    }
    if let Some(services) = services {
        active.services = Set(json!(services));
    }
}

pub async fn create_accounting(
    db: &DatabaseConnection,
    input: AccountingFirmInput,
) -> Result<AccountingFirmDetail, ServiceError> {
    input.validate(true)?;
    check_similar_ids(db, FirmKind::Accounting, None, &input.children).await?;

    let name = input.common.name.clone().unwrap_or_default();
    let slug = unique_slug::<AccountingFirms>(db, accounting_firms::Column::Slug, &name).await?;
    let now = Utc::now().fixed_offset();
    let id = Uuid::new_v4();

    let mut active = accounting_firms::ActiveModel {
        id: Set(id),
        name: Set(String::new()),
        slug: Set(slug),
        headquarters: Set(None),
        state: Set(None),
        description: Set(None),
        website: Set(None),
        founded_year: Set(None),
        fee_structure: Set(None),
        minimum_fee: Set(None),
        minimum_fee_amount: Set(None),
        services: Set(json!([])),
        client_types: Set(json!([])),
        verified: Set(false),
        premium: Set(false),
        rating: Set(None),
        review_count: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
    };
    apply_accounting(&mut active, input.common, input.minimum_fee, input.services);

    let txn = db.begin().await?;
    active.insert(&txn).await?;
    replace_children(&txn, FirmKind::Accounting, id, input.children).await?;
    let detail = accounting_detail_by_id(&txn, id).await?;
    txn.commit().await?;

    info!(firm_id = %id, slug = %detail.summary.slug, "Accounting firm created");
    Ok(detail)
}

pub async fn update_accounting(
    db: &DatabaseConnection,
    id: Uuid,
    input: AccountingFirmInput,
) -> Result<AccountingFirmDetail, ServiceError> {
    input.validate(false)?;
    let firm = AccountingFirms::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| not_found(FirmKind::Accounting))?;
    check_similar_ids(db, FirmKind::Accounting, Some(id), &input.children).await?;

    let mut active = firm.into_active_model();
    apply_accounting(&mut active, input.common, input.minimum_fee, input.services);
    active.updated_at = Set(Utc::now().fixed_offset());

    let txn = db.begin().await?;
    active.update(&txn).await?;
    replace_children(&txn, FirmKind::Accounting, id, input.children).await?;
    let detail = accounting_detail_by_id(&txn, id).await?;
    txn.commit().await?;

    info!(firm_id = %id, "Accounting firm updated");
    Ok(detail)
}

pub async fn delete_accounting(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let txn = db.begin().await?;
    delete_children(&txn, FirmKind::Accounting, id).await?;
    let result = AccountingFirms::delete_by_id(id).exec(&txn).await?;
    if result.rows_affected == 0 {
        txn.rollback().await?;
        return Err(not_found(FirmKind::Accounting));
    }
    txn.commit().await?;
    info!(firm_id = %id, "Accounting firm deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};

    use crate::models::listing::{AssetBucket, FeeBucket};

    fn accounting_firm() -> accounting_firms::Model {
        let now = Utc::now().fixed_offset();
        accounting_firms::Model {
            id: Uuid::new_v4(),
            name: "Ledger & Co CPAs".to_string(),
            slug: "ledger-co-cpas".to_string(),
            headquarters: Some("Austin, TX".to_string()),
            state: Some("Texas".to_string()),
            description: None,
            website: None,
            founded_year: Some(1998),
            fee_structure: None,
            minimum_fee: Some("$100/mo".to_string()),
            minimum_fee_amount: Some(100),
            services: json!(["Bookkeeping", "Payroll"]),
            client_types: json!(["Small Businesses"]),
            verified: true,
            premium: false,
            rating: Some(dec!(4.8)),
            review_count: 31,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_detail_includes_children() {
        let firm = accounting_firm();
        let similar = accounting_firm();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![firm.clone()]])
            .append_query_results([vec![firm_leaders::Model {
                id: 1,
                firm_kind: FirmKind::Accounting,
                firm_id: firm.id,
                name: "Ada Park".to_string(),
                title: "Managing Partner".to_string(),
                bio: None,
                position: 0,
            }]])
            .append_query_results([vec![firm_features::Model {
                id: 1,
                firm_kind: FirmKind::Accounting,
                firm_id: firm.id,
                label: "Dedicated CPA".to_string(),
                position: 0,
            }]])
            .append_query_results([Vec::<firm_registrations::Model>::new()])
            .append_query_results([vec![similar_firms::Model {
                id: 1,
                firm_kind: FirmKind::Accounting,
                firm_id: firm.id,
                similar_firm_id: similar.id,
            }]])
            .append_query_results([vec![similar.clone()]])
            .into_connection();

        let detail = accounting_by_slug(&db, "ledger-co-cpas").await.unwrap();
        assert_eq!(detail.summary.minimum_fee_bucket, "Under $250/mo");
        assert_eq!(detail.children.leaders[0].title, "Managing Partner");
        assert_eq!(detail.children.features, vec!["Dedicated CPA"]);
        assert!(detail.children.registrations.is_empty());
        assert_eq!(detail.children.similar_firms[0].slug, similar.slug);
    }

    #[tokio::test]
    async fn test_missing_slug_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<investment_firms::Model>::new()])
            .into_connection();
        let err = investment_by_slug(&db, "nope").await.unwrap_err();
        assert_eq!(err.to_string(), "Investment firm not found");
    }

    #[tokio::test]
    async fn test_create_validates_before_queries() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let err = create_accounting(&db, AccountingFirmInput::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref f) if f.contains("name")));
        assert!(db.into_transaction_log().is_empty());
    }

    fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        std::collections::BTreeMap::from([("num_items", sea_orm::Value::from(n))])
    }

    #[tokio::test]
    async fn test_investment_filters_reach_query() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row(0)]])
            .append_query_results([Vec::<investment_firms::Model>::new()])
            .into_connection();

        let filters = InvestmentFirmFilters {
            client_type: Some("Retirees".to_string()),
            asset_classes: vec!["Equities".to_string(), "Real Estate".to_string()],
            min_assets: Some(AssetBucket::Over1m),
            ..Default::default()
        };
        let page = list_investment(&db, &filters).await.unwrap();
        assert_eq!(page.total, 0);

        let log = db.into_transaction_log();
        let stmt = &log[1].statements()[0];
        assert!(stmt.sql.contains(r#""client_types" @> $"#));
        assert!(stmt.sql.contains(r#""asset_classes" @> $"#));
        assert!(stmt.sql.contains(r#""investment_firms"."minimum_investment_amount" >= $"#));
        // Open-ended bucket has no upper bound
        assert!(!stmt.sql.contains(r#""investment_firms"."minimum_investment_amount" < $"#));

        let values = &stmt.values.as_ref().expect("bound values").0;
        assert!(values.contains(&sea_orm::Value::from(json!(["Equities", "Real Estate"]))));
        assert!(values.contains(&sea_orm::Value::BigInt(Some(1_000_000))));
    }

    #[tokio::test]
    async fn test_accounting_filters_reach_query() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row(1)]])
            .append_query_results([vec![accounting_firm()]])
            .into_connection();

        let filters = AccountingFirmFilters {
            services: vec!["Bookkeeping".to_string()],
            min_fee: Some(FeeBucket::Under250),
            ..Default::default()
        };
        let page = list_accounting(&db, &filters).await.unwrap();
        assert_eq!(page.items[0].minimum_fee_bucket, "Under $250/mo");

        let log = db.into_transaction_log();
        let stmt = &log[1].statements()[0];
        assert!(stmt.sql.contains(r#""services" @> $"#));
        assert!(stmt.sql.contains(r#""accounting_firms"."minimum_fee_amount" >= $"#));
        assert!(stmt.sql.contains(r#""accounting_firms"."minimum_fee_amount" < $"#));

        let values = &stmt.values.as_ref().expect("bound values").0;
        assert!(values.contains(&sea_orm::Value::from(json!(["Bookkeeping"]))));
        assert!(values.contains(&sea_orm::Value::BigInt(Some(250))));
    }

    #[tokio::test]
    async fn test_no_minimum_fee_bucket_query() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row(0)]])
            .append_query_results([Vec::<accounting_firms::Model>::new()])
            .into_connection();

        let filters = AccountingFirmFilters {
            min_fee: Some(FeeBucket::NoMinimum),
            ..Default::default()
        };
        list_accounting(&db, &filters).await.unwrap();

        let log = db.into_transaction_log();
        let sql = &log[1].statements()[0].sql;
        assert!(sql.contains(r#""accounting_firms"."minimum_fee_amount" IS NULL OR "accounting_firms"."minimum_fee_amount" <= $1"#));
        assert!(sql.ends_with("LIMIT $2 OFFSET $3"));
    }
}
