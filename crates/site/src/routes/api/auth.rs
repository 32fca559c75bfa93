//! Account endpoints: register, login, logout, and the current profile.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use pss_core::{Email, UserId, Username};

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, clear_current_user, session_expiry, set_current_user};
use crate::models::{CurrentUser, User};
use crate::routes::auth::REGISTRATION_SUCCESS;
use crate::services::auth::{AuthService, RegistrationInput};
use crate::state::AppState;

use super::{MessageResponse, json_body};

/// Missing fields deserialize as empty so they are reported as
/// `"<field> is required"` rather than as a malformed body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<RegisterRequest> for RegistrationInput {
    fn from(req: RegisterRequest) -> Self {
        Self {
            username: req.username,
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            password: req.password,
            confirm_password: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub user_id: UserId,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub remember_me: bool,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub user: CurrentUser,
}

/// Profile returned by `GET /api/user`.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
    pub is_verified: bool,
    pub is_approved: bool,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            is_admin: user.is_admin,
            is_verified: user.is_verified,
            is_approved: user.is_approved,
        }
    }
}

/// `POST /api/register`
///
/// # Errors
///
/// 400 for validation failures and duplicates, 500 on database failure.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let input = RegistrationInput::from(json_body(payload)?);
    let registered = AuthService::new(state.pool()).register(&input).await?;

    let email = state.email();
    email.dispatch(email.verification(&registered.user, &registered.verification_token));
    email.dispatch(email.admin_notification(&registered.user));

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: REGISTRATION_SUCCESS,
            user_id: registered.user.id,
        }),
    ))
}

/// `POST /api/login`
///
/// # Errors
///
/// 400 when a field is missing, 401 for bad credentials or an account that
/// is not yet verified or approved.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>> {
    let req = json_body(payload)?;
    let user = AuthService::new(state.pool())
        .login(&req.username, &req.password)
        .await?;

    let current = CurrentUser::from(&user);
    set_current_user(&session, &current).await?;
    if req.remember_me {
        session.set_expiry(Some(session_expiry(true)));
    }
    set_sentry_user(&user.id, user.username.as_str());

    Ok(Json(LoginResponse {
        message: "Login successful",
        user: current,
    }))
}

/// `POST /api/logout`
///
/// # Errors
///
/// 500 if the session store cannot be updated.
pub async fn logout(
    session: Session,
    RequireAuth(_user): RequireAuth,
) -> Result<Json<MessageResponse>> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(MessageResponse::new("Logout successful"))
}

/// `GET /api/user`
///
/// Read fresh from the database so the verification and approval flags are
/// current.
///
/// # Errors
///
/// 404 if the account was deleted after sign-in.
pub async fn current_user(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<UserProfile>> {
    let user = AuthService::new(state.pool()).get_user(user.id).await?;
    Ok(Json(UserProfile::from(user)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_missing_fields_default_empty() {
        let req: RegisterRequest = serde_json::from_str(r#"{"username": "pss416"}"#).unwrap();
        assert_eq!(req.username, "pss416");
        assert!(req.email.is_empty());
        let input = RegistrationInput::from(req);
        assert!(input.confirm_password.is_none());
    }

    #[test]
    fn test_login_request_remember_me_optional() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"username": "a", "password": "b"}"#).unwrap();
        assert!(!req.remember_me);
        let req: LoginRequest =
            serde_json::from_str(r#"{"username": "a", "password": "b", "remember_me": true}"#)
                .unwrap();
        assert!(req.remember_me);
    }
}
