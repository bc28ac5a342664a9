#![allow(dead_code)]

use std::collections::HashMap;

use advisor_directory::{
    config::Config,
    entities::{profiles, sessions},
    routes::build_router,
    services::password::hash_token,
    AppState,
};
use axum::{body::Body, http::Response, Router};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use uuid::Uuid;

pub const TOKEN: &str = "test-session-token";

pub fn test_config() -> Config {
    let values = HashMap::from([
        ("DATABASE_URL", "postgres://advisor@localhost:5432/advisor_directory_test"),
        ("STORAGE_DIR", "target/test-storage"),
    ]);
    Config::from_map(&values).expect("test config")
}

/// Router over a mock connection, with fresh caches per call
pub fn app(db: DatabaseConnection) -> Router {
    build_router(AppState::new(db, test_config()))
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

/// Session row matching [`TOKEN`], valid for another hour
pub fn session_row(user_id: Uuid) -> sessions::Model {
    let now = Utc::now().fixed_offset();
    sessions::Model {
        id: Uuid::new_v4(),
        user_id,
        token_hash: hash_token(TOKEN),
        expires_at: now + Duration::hours(1),
        created_at: now,
    }
}

pub fn profile_row(user_id: Uuid, is_admin: bool) -> profiles::Model {
    let now = Utc::now().fixed_offset();
    profiles::Model {
        id: user_id,
        email: if is_admin { "admin@example.com" } else { "jane@example.com" }.to_string(),
        password_hash: "$argon2id$unused".to_string(),
        full_name: "Jane Doe".to_string(),
        phone: None,
        professional_type: Some("advisor".to_string()),
        is_admin,
        created_at: now,
        updated_at: now,
    }
}
