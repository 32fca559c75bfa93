//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use pss_core::{AccountStatus, Email, UserId, Username};

/// A registered site account (without its password hash).
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub is_verified: bool,
    pub is_approved: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    #[must_use]
    pub const fn status(&self) -> AccountStatus {
        AccountStatus::from_flags(self.is_verified, self.is_approved)
    }

    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Validated input for creating an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: Username,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub verification_token: Option<String>,
    pub verification_expires: Option<DateTime<Utc>>,
    pub is_verified: bool,
    pub is_approved: bool,
    pub is_admin: bool,
}
