// src/lib.rs

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use services::{
    auth::AuthService,
    listing::ListingCaches,
    rate_limit::{RateLimiter, MEETING_REQUESTS_PER_MINUTE},
    storage::ObjectStore,
};

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<Config>,
    pub auth: AuthService,
    pub caches: ListingCaches,
    pub storage: Arc<dyn ObjectStore>,
    pub rate_limiter: RateLimiter,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        let storage = services::storage::from_config(&config);
        Self::with_storage(db, config, storage)
    }

    pub fn with_storage(db: DatabaseConnection, config: Config, storage: Arc<dyn ObjectStore>) -> Self {
        Self {
            db: Arc::new(db),
            auth: AuthService::new(config.session_ttl_hours),
            config: Arc::new(config),
            caches: ListingCaches::new(),
            storage,
            rate_limiter: RateLimiter::new(MEETING_REQUESTS_PER_MINUTE),
        }
    }
}

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;

pub mod entities {
    pub mod prelude;
    pub mod profiles;
    pub mod sessions;
    pub mod password_resets;
    pub mod advisors;
    pub mod investment_firms;
    pub mod accounting_firms;
    pub mod firm_kind;
    pub mod firm_leaders;
    pub mod firm_features;
    pub mod firm_registrations;
    pub mod similar_firms;
    pub mod blog_posts;
    pub mod blog_categories;
    pub mod blog_post_categories;
    pub mod meeting_requests;
    pub mod newsletter_signups;
}

pub mod services {
    pub mod auth;
    pub mod password;
    pub mod listing;
    pub mod slug;
    pub mod advisors;
    pub mod firms;
    pub mod blog;
    pub mod markdown;
    pub mod meeting_requests;
    pub mod newsletter;
    pub mod rate_limit;
    pub mod storage;
    pub mod static_pages;
}

pub mod models {
    pub mod listing;
    pub mod catalog;
    pub mod auth;
    pub mod advisor;
    pub mod firm;
    pub mod blog;
    pub mod meeting_request;
    pub mod newsletter;
}

pub mod handlers {
    pub mod upload;
    pub mod auth;
    pub mod profile;
    pub mod catalog;
    pub mod advisors;
    pub mod admin_advisors;
    pub mod firms;
    pub mod blog;
    pub mod meeting_requests;
    pub mod newsletter;
}
