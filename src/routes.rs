use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, patch, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::StorageConfig;
use crate::handlers::{
    admin_advisors, advisors, auth, blog, catalog, firms, meeting_requests, newsletter, profile,
};
use crate::services::storage::MAX_UPLOAD_BYTES;
use crate::AppState;

/// Multipart framing on top of the largest accepted image
const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 1024 * 1024;

async fn health() -> &'static str {
    "ok"
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(allowed)
}

pub fn build_router(state: AppState) -> Router {
    let uploads = Router::new()
        .route("/api/advisors/me/headshot", post(advisors::upload_headshot))
        .route("/api/admin/blog/images", post(blog::upload_blog_image))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT));

    let api = Router::new()
        .route("/health", get(health))
        .route("/api/catalog", get(catalog::get_catalog))
        .route("/api/newsletter", post(newsletter::subscribe))
        // Accounts
        .route("/api/auth/sign-up", post(auth::sign_up))
        .route("/api/auth/sign-in", post(auth::sign_in))
        .route("/api/auth/sign-out", post(auth::sign_out))
        .route("/api/auth/session", get(auth::session))
        .route("/api/auth/forgot-password", post(auth::forgot_password))
        .route("/api/auth/reset-password", post(auth::reset_password))
        .route(
            "/api/profile",
            get(profile::get_profile).patch(profile::update_profile),
        )
        // Advisors
        .route("/api/advisors", get(advisors::list_advisors))
        .route("/api/advisors/register", post(advisors::register_advisor))
        .route(
            "/api/advisors/me",
            get(advisors::get_own_advisor).patch(advisors::update_own_advisor),
        )
        .route("/api/advisors/me/submit", post(advisors::submit_own_advisor))
        .route(
            "/api/advisors/me/meeting-requests",
            get(meeting_requests::list_own_meeting_requests),
        )
        .route("/api/advisors/{advisor}", get(advisors::get_advisor))
        .route(
            "/api/advisors/{advisor}/meeting-requests",
            post(meeting_requests::create_meeting_request),
        )
        .route(
            "/api/meeting-requests/{id}",
            patch(meeting_requests::update_meeting_request_status),
        )
        // Firms
        .route("/api/investment-firms", get(firms::list_investment_firms))
        .route("/api/investment-firms/{slug}", get(firms::get_investment_firm))
        .route("/api/accounting-firms", get(firms::list_accounting_firms))
        .route("/api/accounting-firms/{slug}", get(firms::get_accounting_firm))
        // Blog
        .route("/api/blog/posts", get(blog::list_posts))
        .route("/api/blog/posts/{slug}", get(blog::get_post))
        .route("/api/blog/categories", get(blog::list_categories))
        // Admin
        .route("/api/admin/advisors", get(admin_advisors::list_advisors))
        .route(
            "/api/admin/advisors/{id}",
            patch(admin_advisors::update_advisor).delete(admin_advisors::delete_advisor),
        )
        .route("/api/admin/advisors/{id}/approve", post(admin_advisors::approve_advisor))
        .route("/api/admin/advisors/{id}/reject", post(admin_advisors::reject_advisor))
        .route(
            "/api/admin/meeting-requests",
            get(meeting_requests::admin_list_meeting_requests),
        )
        .route("/api/admin/investment-firms", post(firms::create_investment_firm))
        .route(
            "/api/admin/investment-firms/{id}",
            patch(firms::update_investment_firm).delete(firms::delete_investment_firm),
        )
        .route("/api/admin/accounting-firms", post(firms::create_accounting_firm))
        .route(
            "/api/admin/accounting-firms/{id}",
            patch(firms::update_accounting_firm).delete(firms::delete_accounting_firm),
        )
        .route("/api/admin/blog/posts", post(blog::create_post))
        .route(
            "/api/admin/blog/posts/{id}",
            patch(blog::update_post).delete(blog::delete_post),
        )
        .route(
            "/api/admin/blog/posts/{id}/categories/{category_id}",
            put(blog::attach_category).delete(blog::detach_category),
        )
        .route("/api/admin/blog/categories", post(blog::create_category))
        .route("/api/admin/blog/format", post(blog::format_markdown))
        .merge(uploads);

    let mut router = api;
    if let StorageConfig::Local { dir } = &state.config.storage {
        router = router.nest_service("/storage", ServeDir::new(dir));
    }

    router
        .layer(cors_layer(&state.config.cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
