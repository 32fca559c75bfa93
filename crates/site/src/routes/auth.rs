//! Authentication route handlers (HTML forms).
//!
//! Sign-in, registration, sign-out, and the email verification link. The
//! JSON equivalents live in [`super::api::auth`].

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_user, session_expiry, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::{AuthError, AuthService, RegistrationInput, validate_registration};
use crate::state::AppState;

/// Shown after a successful registration.
pub const REGISTRATION_SUCCESS: &str =
    "Registration successful! Please check your email to verify your account.";

const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

// =============================================================================
// Form Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SigninForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Checkbox: present as `on` when ticked, absent otherwise.
    #[serde(default)]
    pub remember_me: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

impl From<RegisterForm> for RegistrationInput {
    fn from(form: RegisterForm) -> Self {
        Self {
            username: form.username,
            email: form.email,
            first_name: form.first_name,
            last_name: form.last_name,
            password: form.password,
            confirm_password: Some(form.confirm_password),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SigninQuery {
    pub verified: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "auth/signin.html")]
pub struct SigninTemplate {
    pub current_user: Option<CurrentUser>,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub username: String,
}

/// Previously entered values are echoed back; passwords never are.
#[derive(Debug, Default, Clone)]
pub struct RegisterValues {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub current_user: Option<CurrentUser>,
    pub error: Option<String>,
    pub success: Option<String>,
    pub values: RegisterValues,
}

#[derive(Template, WebTemplate)]
#[template(path = "auth/verify_email.html")]
pub struct VerifyEmailTemplate {
    pub current_user: Option<CurrentUser>,
    pub verified: bool,
    pub message: String,
}

// =============================================================================
// Sign-in
// =============================================================================

/// Display the sign-in page. Already signed-in visitors go to the dashboard.
pub async fn signin_page(
    OptionalAuth(current_user): OptionalAuth,
    Query(query): Query<SigninQuery>,
) -> Response {
    if current_user.is_some() {
        return Redirect::to("/dashboard").into_response();
    }
    SigninTemplate {
        current_user: None,
        error: None,
        notice: query
            .verified
            .map(|_| "Email verified successfully! You can now log in.".to_string()),
        username: String::new(),
    }
    .into_response()
}

/// Handle sign-in form submission.
#[instrument(skip_all)]
pub async fn signin(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SigninForm>,
) -> Response {
    let rerender = |status: StatusCode, error: String, username: String| {
        (
            status,
            SigninTemplate {
                current_user: None,
                error: Some(error),
                notice: None,
                username,
            },
        )
            .into_response()
    };

    let user = match AuthService::new(state.pool())
        .login(&form.username, &form.password)
        .await
    {
        Ok(user) => user,
        Err(e) if e.is_user_facing() => {
            tracing::info!(error = %e, "Sign-in rejected");
            return rerender(StatusCode::UNAUTHORIZED, e.to_string(), form.username);
        }
        Err(e) => {
            let event_id = sentry::capture_error(&e);
            tracing::error!(error = %e, sentry_event_id = %event_id, "Sign-in failed");
            return rerender(
                StatusCode::INTERNAL_SERVER_ERROR,
                GENERIC_FAILURE.to_string(),
                form.username,
            );
        }
    };

    let current = CurrentUser::from(&user);
    if let Err(e) = set_current_user(&session, &current).await {
        tracing::error!("Failed to set session: {}", e);
        return rerender(
            StatusCode::INTERNAL_SERVER_ERROR,
            GENERIC_FAILURE.to_string(),
            form.username,
        );
    }
    if form.remember_me.is_some() {
        session.set_expiry(Some(session_expiry(true)));
    }
    set_sentry_user(&user.id, user.username.as_str());

    Redirect::to("/dashboard").into_response()
}

// =============================================================================
// Registration
// =============================================================================

pub async fn register_page(OptionalAuth(current_user): OptionalAuth) -> Response {
    if current_user.is_some() {
        return Redirect::to("/dashboard").into_response();
    }
    RegisterTemplate {
        current_user: None,
        error: None,
        success: None,
        values: RegisterValues::default(),
    }
    .into_response()
}

/// Handle registration form submission.
///
/// Confirmation and length checks run before the database is consulted.
/// On success the form is cleared and the verification and admin emails
/// are dispatched in the background.
#[instrument(skip_all)]
pub async fn register(State(state): State<AppState>, Form(form): Form<RegisterForm>) -> Response {
    let values = RegisterValues {
        username: form.username.trim().to_string(),
        email: form.email.trim().to_string(),
        first_name: form.first_name.trim().to_string(),
        last_name: form.last_name.trim().to_string(),
    };
    let input = RegistrationInput::from(form);

    let rerender = |status: StatusCode, error: String, values: RegisterValues| {
        (
            status,
            RegisterTemplate {
                current_user: None,
                error: Some(error),
                success: None,
                values,
            },
        )
            .into_response()
    };

    if let Err(e) = validate_registration(&input) {
        return rerender(StatusCode::BAD_REQUEST, e.to_string(), values);
    }

    match AuthService::new(state.pool()).register(&input).await {
        Ok(registered) => {
            let email = state.email();
            email.dispatch(email.verification(&registered.user, &registered.verification_token));
            email.dispatch(email.admin_notification(&registered.user));

            RegisterTemplate {
                current_user: None,
                error: None,
                success: Some(REGISTRATION_SUCCESS.to_string()),
                values: RegisterValues::default(),
            }
            .into_response()
        }
        Err(e) if e.is_user_facing() => rerender(StatusCode::BAD_REQUEST, e.to_string(), values),
        Err(e) => {
            let event_id = sentry::capture_error(&e);
            tracing::error!(error = %e, sentry_event_id = %event_id, "Registration failed");
            rerender(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Registration failed. Please try again.".to_string(),
                values,
            )
        }
    }
}

// =============================================================================
// Sign-out and verification
// =============================================================================

pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }
    clear_sentry_user();
    Redirect::to("/").into_response()
}

/// Consume an emailed verification link.
#[instrument(skip_all)]
pub async fn verify_email(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
    Path(token): Path<String>,
) -> Response {
    match AuthService::new(state.pool()).verify_email(&token).await {
        Ok(_) => VerifyEmailTemplate {
            current_user,
            verified: true,
            message: "Email verified successfully! You can now log in once an administrator approves your account.".to_string(),
        }
        .into_response(),
        Err(e @ (AuthError::InvalidToken | AuthError::TokenExpired)) => (
            StatusCode::BAD_REQUEST,
            VerifyEmailTemplate {
                current_user,
                verified: false,
                message: e.to_string(),
            },
        )
            .into_response(),
        Err(e) => {
            let event_id = sentry::capture_error(&e);
            tracing::error!(error = %e, sentry_event_id = %event_id, "Email verification failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                VerifyEmailTemplate {
                    current_user,
                    verified: false,
                    message: "Verification failed".to_string(),
                },
            )
                .into_response()
        }
    }
}
