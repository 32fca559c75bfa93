//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use pss_core::{Email, UserId, Username};

use super::User;

/// Session-stored user identity.
///
/// This is what the navbar, dashboard, and route guard read; the database is
/// only consulted again for pages that need fresher data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_admin: user.is_admin,
        }
    }
}

impl CurrentUser {
    /// Two-letter avatar text for the navbar.
    #[must_use]
    pub fn initials(&self) -> String {
        self.first_name
            .chars()
            .take(1)
            .chain(self.last_name.chars().take(1))
            .flat_map(char::to_uppercase)
            .collect()
    }

    #[must_use]
    pub const fn role_label(&self) -> &'static str {
        if self.is_admin { "Administrator" } else { "User" }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(first: &str, last: &str, is_admin: bool) -> CurrentUser {
        CurrentUser {
            id: UserId::new(1),
            username: Username::parse("pss416").unwrap(),
            email: Email::parse("pss416@nyu.edu").unwrap(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            is_admin,
        }
    }

    #[test]
    fn test_initials() {
        assert_eq!(user("paul", "schlindwein", false).initials(), "PS");
        assert_eq!(user("Guest", "", false).initials(), "G");
    }

    #[test]
    fn test_role_label() {
        assert_eq!(user("Paul", "S", true).role_label(), "Administrator");
        assert_eq!(user("Paul", "S", false).role_label(), "User");
    }

    #[test]
    fn test_session_round_trip_shape() {
        let json = serde_json::to_value(user("Paul", "S", false)).unwrap();
        assert_eq!(json["username"], "pss416");
        let back: CurrentUser = serde_json::from_value(json).unwrap();
        assert_eq!(back.first_name, "Paul");
    }
}
