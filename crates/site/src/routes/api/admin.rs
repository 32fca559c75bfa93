//! Admin-only user management endpoints.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tracing::instrument;

use pss_core::UserId;

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::User;
use crate::routes::admin::apply_approval;
use crate::services::auth::AuthService;
use crate::state::AppState;

use super::MessageResponse;

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<User>,
}

/// `GET /api/admin/users`
///
/// # Errors
///
/// 500 on database failure.
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<UsersResponse>> {
    let users = AuthService::new(state.pool()).list_users().await?;
    Ok(Json(UsersResponse { users }))
}

/// `POST /api/admin/users/{id}/approve`
///
/// # Errors
///
/// 404 for an unknown user.
#[instrument(skip(state, admin))]
pub async fn approve(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<Json<MessageResponse>> {
    let user = apply_approval(&state, id, true).await?;
    tracing::info!(
        admin = admin.username.as_str(),
        user = user.username.as_str(),
        "User approved"
    );
    Ok(MessageResponse::new(format!(
        "User {} approved successfully",
        user.username
    )))
}

/// `POST /api/admin/users/{id}/reject`
///
/// # Errors
///
/// 404 for an unknown user.
#[instrument(skip(state, admin))]
pub async fn reject(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<Json<MessageResponse>> {
    let user = apply_approval(&state, id, false).await?;
    tracing::info!(
        admin = admin.username.as_str(),
        user = user.username.as_str(),
        "User rejected"
    );
    Ok(MessageResponse::new(format!("User {} rejected", user.username)))
}
