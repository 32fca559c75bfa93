//! Signed-in landing page.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;

#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub current_user: Option<CurrentUser>,
    pub user: CurrentUser,
}

/// Welcome card with the account details held in the session.
pub async fn dashboard(RequireAuth(user): RequireAuth) -> impl IntoResponse {
    DashboardTemplate {
        current_user: Some(user.clone()),
        user,
    }
}
