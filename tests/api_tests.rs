mod common;

use std::collections::BTreeMap;
use std::net::SocketAddr;

use advisor_directory::entities::advisors::{self, AdvisorStatus};
use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Method, Request, StatusCode},
};
use chrono::Utc;
use sea_orm::{DatabaseBackend, MockDatabase, Value};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use crate::common::{app, body_json, profile_row, session_row, TOKEN};

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: Method, uri: &str, body: serde_json::Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Mock connection that resolves [`TOKEN`] to a signed-in user
fn signed_in_db(is_admin: bool) -> MockDatabase {
    let user_id = Uuid::new_v4();
    MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![session_row(user_id)]])
        .append_query_results([vec![profile_row(user_id, is_admin)]])
}

fn approved_advisor() -> advisors::Model {
    let now = Utc::now().fixed_offset();
    advisors::Model {
        id: Uuid::new_v4(),
        user_id: Some(Uuid::new_v4()),
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
        status: AdvisorStatus::Approved,
        approved_by: None,
        approved_at: Some(now),
        rejection_reason: None,
        verified: true,
        premium: false,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn test_health() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let response = app(db).oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_catalog_lists_reference_data() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let response = app(db).oneshot(get("/api/catalog")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["services"].as_array().unwrap().iter().any(|s| s == "Retirement Planning"));
    assert!(json["states"].as_array().unwrap().iter().any(|s| s == "Texas"));
    assert!(!json["asset_buckets"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_own_advisor_requires_session() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let response = app(db).oneshot(get("/api/advisors/me")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_register_with_short_bio_returns_field_errors() {
    let db = signed_in_db(false).into_connection();
    let body = json!({
        "name": "Jane Doe",
        "firm_name": "Lone Star Wealth",
        "personal_bio": "Too short",
        "firm_bio": "Independent fee-only planning firm.",
        "email": "jane@example.com",
        "years_of_experience": 20,
        "services": ["Retirement Planning"],
        "client_types": ["Retirees"],
        "terms_accepted": true
    });

    let response = app(db)
        .oneshot(json_request(Method::POST, "/api/advisors/register", body, Some(TOKEN)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["fields"]["personal_bio"], "Bio must be at least 10 characters");
    assert!(json["fields"].get("firm_bio").is_none());
}

#[tokio::test]
async fn test_reject_requires_reason() {
    let db = signed_in_db(true).into_connection();
    let uri = format!("/api/admin/advisors/{}/reject", Uuid::new_v4());

    let response = app(db)
        .oneshot(json_request(Method::POST, &uri, json!({ "reason": "   " }), Some(TOKEN)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["fields"]["reason"], "A rejection reason is required");
}

#[tokio::test]
async fn test_admin_route_refuses_regular_user() {
    let db = signed_in_db(false).into_connection();
    let response = app(db)
        .oneshot(
            Request::builder()
                .uri("/api/admin/meeting-requests")
                .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_meeting_request_needs_a_topic() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let uri = format!("/api/advisors/{}/meeting-requests", Uuid::new_v4());
    let body = json!({
        "name": "Sam Client",
        "email": "sam@example.com",
        "preferred_contact_method": "email",
        "topics": []
    });

    let response = app(db)
        .oneshot(json_request(Method::POST, &uri, body, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["fields"]["topics"], "Select at least one topic");
}

#[tokio::test]
async fn test_advisor_directory_page() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![BTreeMap::from([(
            "num_items",
            Into::<Value>::into(1i64),
        )])]])
        .append_query_results([vec![approved_advisor()]])
        .into_connection();

    let response = app(db)
        .oneshot(get("/api/advisors?state=Texas&page=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["items"][0]["slug"], "jane-doe");
    assert_eq!(json["items"][0]["services"], json!(["Retirement Planning"]));
}

#[tokio::test]
async fn test_unknown_state_filter_rejected() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let response = app(db)
        .oneshot(get("/api/advisors?state=Atlantis"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert!(json["fields"].get("state").is_some());
}

fn meeting_request_from(peer: &str) -> Request<Body> {
    let addr: SocketAddr = peer.parse().unwrap();
    // Fails validation, so no query is needed; the limiter still counts it
    let body = json!({
        "name": "Sam Client",
        "email": "sam@example.com",
        "preferred_contact_method": "email",
        "topics": []
    });
    Request::builder()
        .method(Method::POST)
        .uri(format!("/api/advisors/{}/meeting-requests", Uuid::new_v4()))
        .header(header::CONTENT_TYPE, "application/json")
        .extension(ConnectInfo(addr))
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_meeting_rate_limit_is_per_peer() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = app(db);

    for n in 1..=6 {
        let peer = format!("198.51.100.{n}:40000");
        let response = app.clone().oneshot(meeting_request_from(&peer)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "peer {peer}");
    }

    let mut statuses = Vec::new();
    for _ in 0..6 {
        let response = app
            .clone()
            .oneshot(meeting_request_from("203.0.113.9:40000"))
            .await
            .unwrap();
        statuses.push(response.status());
    }
    assert_eq!(statuses[4], StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(statuses[5], StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_untrusted_forwarded_header_cannot_dodge_limit() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = app(db);

    let mut last = StatusCode::OK;
    for n in 1..=6 {
        let mut request = meeting_request_from("203.0.113.9:40000");
        request
            .headers_mut()
            .insert("x-forwarded-for", format!("10.0.0.{n}").parse().unwrap());
        last = app.clone().oneshot(request).await.unwrap().status();
    }
    assert_eq!(last, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_advisor_named_me_keeps_reachable_slug() {
    // "me" is a static route; registration gives such advisors "me-2"
    let mut advisor = approved_advisor();
    advisor.slug = "me-2".to_string();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![advisor]])
        .into_connection();

    let response = app(db).oneshot(get("/api/advisors/me-2")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["slug"], "me-2");
}
