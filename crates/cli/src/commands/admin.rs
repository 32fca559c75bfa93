//! Admin account provisioning.
//!
//! The site has no way to promote an account, so the first admin is created
//! here, already verified and approved.

use pss_site::services::auth::{AuthService, RegistrationInput};

use super::{CliError, connect};

pub struct NewAdmin {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<NewAdmin> for RegistrationInput {
    fn from(admin: NewAdmin) -> Self {
        Self {
            username: admin.username,
            email: admin.email,
            first_name: admin.first_name,
            last_name: admin.last_name,
            password: admin.password,
            confirm_password: None,
        }
    }
}

/// Create an admin account that can sign in immediately.
///
/// Input goes through the same validation as registration.
///
/// # Errors
///
/// Returns `CliError::Auth` for invalid input or a duplicate username or
/// email.
pub async fn create(admin: NewAdmin) -> Result<(), CliError> {
    let pool = connect().await?;
    let input = RegistrationInput::from(admin);

    let user = AuthService::new(&pool)
        .create_active_user(&input, true)
        .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Username: {}, Email: {}",
        user.id,
        user.username,
        user.email
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_input_has_no_confirmation() {
        let input = RegistrationInput::from(NewAdmin {
            username: "admin".into(),
            email: "admin@example.com".into(),
            password: "correct horse".into(),
            first_name: "Admin".into(),
            last_name: "User".into(),
        });
        assert_eq!(input.confirm_password, None);
        assert_eq!(input.username, "admin");
    }
}
