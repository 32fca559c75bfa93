//! Admin panel: review registrations and approve or reject them.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use pss_core::UserId;

use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::{CurrentUser, User};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

use super::{internal_error, not_found};

#[derive(Template, WebTemplate)]
#[template(path = "admin/users.html")]
pub struct AdminUsersTemplate {
    pub current_user: Option<CurrentUser>,
    pub users: Vec<User>,
}

#[instrument(skip_all)]
pub async fn users(State(state): State<AppState>, RequireAdmin(admin): RequireAdmin) -> Response {
    match AuthService::new(state.pool()).list_users().await {
        Ok(users) => AdminUsersTemplate {
            current_user: Some(admin),
            users,
        }
        .into_response(),
        Err(e) => internal_error(&e, Some(admin)),
    }
}

/// Set the approval flag, email the user, and return to the list.
pub(crate) async fn apply_approval(
    state: &AppState,
    id: UserId,
    approved: bool,
) -> Result<User, AuthError> {
    let user = AuthService::new(state.pool()).set_approval(id, approved).await?;
    let email = state.email();
    email.dispatch(email.approval(&user, approved));
    Ok(user)
}

async fn change_approval(state: &AppState, admin: CurrentUser, id: UserId, approved: bool) -> Response {
    match apply_approval(state, id, approved).await {
        Ok(_) => Redirect::to("/admin").into_response(),
        Err(AuthError::UserNotFound) => not_found(Some(admin)),
        Err(e) => internal_error(&e, Some(admin)),
    }
}

#[instrument(skip(state, admin))]
pub async fn approve(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> Response {
    change_approval(&state, admin, id, true).await
}

#[instrument(skip(state, admin))]
pub async fn reject(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> Response {
    change_approval(&state, admin, id, false).await
}
