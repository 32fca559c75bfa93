//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                         - Home page (intro sequence)
//! GET  /about, /contact, /interests, /sports, /finance, /projects, /guest
//!
//! # Auth (HTML forms)
//! GET  /signin, POST /signin     - Sign in (POST rate limited)
//! GET  /register, POST /register - Register (POST rate limited)
//! POST /logout                   - Sign out
//! GET  /verify-email/{token}     - Email verification link
//!
//! # Signed in
//! GET  /dashboard
//! GET  /customers                - Stats, search, table
//! GET  /customers/table          - Table fragment for the search script
//! GET  /customers/{id}           - Customer detail
//! GET  /admin                    - User approvals (admin)
//! POST /admin/users/{id}/approve|reject
//!
//! # JSON API (rate limited)
//! GET  /api/ping
//! POST /api/register, /api/login, /api/logout
//! GET  /api/user
//! GET  /api/admin/users
//! POST /api/admin/users/{id}/approve|reject
//! GET  /api/customers, /api/customers/{id}, /api/campaigns, /api/dashboard/stats
//!
//! GET  /health, /health/ready
//! ```

pub mod admin;
pub mod api;
pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod pages;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::filters;
use crate::middleware::{OptionalAuth, api_rate_limiter, auth_rate_limiter};
use crate::models::CurrentUser;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub current_user: Option<CurrentUser>,
    pub status: u16,
    pub title: &'static str,
    pub message: String,
}

/// HTML 404 inside the site layout.
pub(crate) fn not_found(current_user: Option<CurrentUser>) -> Response {
    (
        StatusCode::NOT_FOUND,
        ErrorTemplate {
            current_user,
            status: 404,
            title: "Page not found",
            message: "The page you were looking for does not exist.".to_string(),
        },
    )
        .into_response()
}

/// HTML 500. The error is reported to Sentry; the visitor sees a generic
/// message.
pub(crate) fn internal_error(
    error: &(dyn std::error::Error + 'static),
    current_user: Option<CurrentUser>,
) -> Response {
    let event_id = sentry::capture_error(error);
    tracing::error!(error = %error, sentry_event_id = %event_id, "Page error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorTemplate {
            current_user,
            status: 500,
            title: "Something went wrong",
            message: "Please try again in a moment.".to_string(),
        },
    )
        .into_response()
}

async fn fallback(OptionalAuth(current_user): OptionalAuth) -> Response {
    not_found(current_user)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Public marketing pages.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route("/about", get(pages::about))
        .route("/contact", get(pages::contact))
        .route("/interests", get(pages::interests))
        .route("/sports", get(pages::sports))
        .route("/finance", get(pages::finance))
        .route("/projects", get(pages::projects))
        .route("/guest", get(pages::guest))
}

/// Sign-in and registration forms. Only the submissions are rate limited.
pub fn auth_routes() -> Router<AppState> {
    let submissions = Router::new()
        .route("/signin", post(auth::signin))
        .route("/register", post(auth::register))
        .layer(auth_rate_limiter());

    Router::new()
        .route("/signin", get(auth::signin_page))
        .route("/register", get(auth::register_page))
        .route("/logout", post(auth::logout))
        .route("/verify-email/{token}", get(auth::verify_email))
        .merge(submissions)
}

/// Pages behind the sign-in guard.
pub fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard::dashboard))
        .route("/customers", get(customers::index))
        .route("/customers/table", get(customers::table))
        .route("/customers/{id}", get(customers::show))
        .route("/admin", get(admin::users))
        .route("/admin/users/{id}/approve", post(admin::approve))
        .route("/admin/users/{id}/reject", post(admin::reject))
}

/// The JSON API, mounted under `/api`.
pub fn api_routes() -> Router<AppState> {
    let credentials = Router::new()
        .route("/register", post(api::auth::register))
        .route("/login", post(api::auth::login))
        .layer(auth_rate_limiter());

    Router::new()
        .route("/ping", get(api::ping))
        .route("/logout", post(api::auth::logout))
        .route("/user", get(api::auth::current_user))
        .route("/admin/users", get(api::admin::list_users))
        .route("/admin/users/{id}/approve", post(api::admin::approve))
        .route("/admin/users/{id}/reject", post(api::admin::reject))
        .route("/customers", get(api::customers::list))
        .route("/customers/{id}", get(api::customers::show))
        .route("/campaigns", get(api::customers::campaigns))
        .route("/dashboard/stats", get(api::customers::stats))
        .merge(credentials)
        .fallback(api::not_found)
        .layer(api_rate_limiter())
}

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(page_routes())
        .merge(auth_routes())
        .merge(member_routes())
        .nest("/api", api_routes())
        .fallback(fallback)
}
