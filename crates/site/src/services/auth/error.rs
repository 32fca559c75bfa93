//! Authentication error types.
//!
//! The `Display` text of the user-facing variants is shown verbatim on the
//! sign-in and registration forms and in API error bodies.

use thiserror::Error;

use crate::db::RepositoryError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{0} must be at most {1} characters")]
    FieldTooLong(&'static str, usize),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password must be at least {0} characters long")]
    WeakPassword(usize),

    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] pss_core::UsernameError),

    #[error("Invalid email address: {0}")]
    InvalidEmail(#[from] pss_core::EmailError),

    #[error("Username already taken")]
    UsernameTaken,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Username and password are required")]
    MissingCredentials,

    /// Wrong password or unknown username.
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Please verify your email before logging in")]
    EmailNotVerified,

    #[error("Your account is pending approval")]
    PendingApproval,

    #[error("Invalid verification token")]
    InvalidToken,

    #[error("Verification token has expired")]
    TokenExpired,

    #[error("User not found")]
    UserNotFound,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Whether the message is safe and useful to show the visitor.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        !matches!(self, Self::Repository(_) | Self::PasswordHash)
    }
}
