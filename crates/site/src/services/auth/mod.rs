//! Authentication service.
//!
//! Registration with email verification, admin approval, and password
//! sign-in. Passwords are hashed with Argon2id.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use pss_core::{AccountStatus, Email, UserId, Username};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::{NewUser, User};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// How long an email verification link stays valid.
pub const VERIFICATION_TOKEN_TTL_HOURS: i64 = 24;

const MAX_NAME_LENGTH: usize = 50;

/// Raw registration input from the HTML form or the JSON API.
///
/// `confirm_password` is only present on the HTML form.
#[derive(Debug, Clone, Default)]
pub struct RegistrationInput {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub confirm_password: Option<String>,
}

/// Registration input that passed every check that needs no database.
#[derive(Debug, Clone)]
pub struct ValidRegistration {
    pub username: Username,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    password: String,
}

/// A freshly registered account and the token to email to it.
#[derive(Debug, Clone)]
pub struct Registered {
    pub user: User,
    pub verification_token: String,
}

/// Validate registration input without touching the database.
///
/// Checks run in the order the form reports them: password confirmation,
/// then required fields, then password length, then field formats. A
/// mismatched confirmation is always the reported error.
///
/// # Errors
///
/// Returns the first [`AuthError`] the input triggers.
pub fn validate_registration(input: &RegistrationInput) -> Result<ValidRegistration, AuthError> {
    if let Some(confirm) = &input.confirm_password
        && confirm != &input.password
    {
        return Err(AuthError::PasswordMismatch);
    }

    let required = [
        ("username", &input.username),
        ("email", &input.email),
        ("password", &input.password),
        ("first_name", &input.first_name),
        ("last_name", &input.last_name),
    ];
    if let Some(&(field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
        return Err(AuthError::MissingField(field));
    }
    validate_password(&input.password)?;

    let username = Username::parse(&input.username)?;
    let email = Email::parse(&input.email)?;
    let first_name = validate_name("first_name", &input.first_name)?;
    let last_name = validate_name("last_name", &input.last_name)?;

    Ok(ValidRegistration {
        username,
        email,
        first_name,
        last_name,
        password: input.password.clone(),
    })
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new, unverified and unapproved account.
    ///
    /// # Errors
    ///
    /// Returns a validation variant for bad input, `UsernameTaken` or
    /// `EmailTaken` for duplicates, or `Repository` on database failure.
    pub async fn register(&self, input: &RegistrationInput) -> Result<Registered, AuthError> {
        let valid = validate_registration(input)?;
        let verification_token = generate_verification_token();
        let expires = Utc::now() + Duration::hours(VERIFICATION_TOKEN_TTL_HOURS);
        let user = self
            .insert(valid, Some((verification_token.clone(), expires)), false)
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(Registered {
            user,
            verification_token,
        })
    }

    /// Create an account that can sign in immediately (CLI provisioning).
    ///
    /// # Errors
    ///
    /// Same as [`Self::register`].
    pub async fn create_active_user(
        &self,
        input: &RegistrationInput,
        is_admin: bool,
    ) -> Result<User, AuthError> {
        let valid = validate_registration(input)?;
        self.insert(valid, None, is_admin).await
    }

    async fn insert(
        &self,
        valid: ValidRegistration,
        verification: Option<(String, DateTime<Utc>)>,
        is_admin: bool,
    ) -> Result<User, AuthError> {
        if self.users.username_exists(valid.username.as_str()).await? {
            return Err(AuthError::UsernameTaken);
        }
        if self.users.email_exists(&valid.email).await? {
            return Err(AuthError::EmailTaken);
        }

        let active = verification.is_none();
        let (verification_token, verification_expires) = verification.unzip();
        let new_user = NewUser {
            password_hash: hash_password(&valid.password)?,
            username: valid.username,
            email: valid.email,
            first_name: valid.first_name,
            last_name: valid.last_name,
            verification_token,
            verification_expires,
            is_verified: active,
            is_approved: active,
            is_admin,
        };

        self.users.create(&new_user).await.map_err(|e| match e {
            RepositoryError::Conflict(c) if c.contains("email") => AuthError::EmailTaken,
            RepositoryError::Conflict(_) => AuthError::UsernameTaken,
            other => AuthError::Repository(other),
        })
    }

    /// Sign in with username and password.
    ///
    /// The password is checked before account status so that status is never
    /// revealed to someone without the password. Records `last_login` on
    /// success.
    ///
    /// # Errors
    ///
    /// `MissingCredentials`, `InvalidCredentials`, `EmailNotVerified`, or
    /// `PendingApproval`.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let (user, password_hash) = self
            .users
            .get_password_hash(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;
        check_can_sign_in(user.status())?;

        self.users.record_login(user.id).await?;
        tracing::info!(user_id = %user.id, "User signed in");
        Ok(user)
    }

    /// Consume an email verification token.
    ///
    /// # Errors
    ///
    /// `InvalidToken` for an unknown token, `TokenExpired` once past its
    /// expiry.
    pub async fn verify_email(&self, token: &str) -> Result<User, AuthError> {
        let (mut user, expires) = self
            .users
            .get_by_verification_token(token)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if token_expired(expires, Utc::now()) {
            return Err(AuthError::TokenExpired);
        }

        self.users.mark_verified(user.id).await?;
        user.is_verified = true;
        tracing::info!(user_id = %user.id, "Email verified");
        Ok(user)
    }

    /// Approve or reject an account.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if the ID does not exist.
    pub async fn set_approval(&self, id: UserId, approved: bool) -> Result<User, AuthError> {
        let user = self
            .users
            .set_approved(id, approved)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::UserNotFound,
                other => AuthError::Repository(other),
            })?;
        tracing::info!(user_id = %id, approved, "Account approval changed");
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns `UserNotFound` if the ID does not exist.
    pub async fn get_user(&self, id: UserId) -> Result<User, AuthError> {
        self.users.get_by_id(id).await?.ok_or(AuthError::UserNotFound)
    }

    /// # Errors
    ///
    /// Returns `Repository` on database failure.
    pub async fn list_users(&self) -> Result<Vec<User>, AuthError> {
        Ok(self.users.list().await?)
    }
}

/// Map an account status to the sign-in error it produces.
///
/// # Errors
///
/// `EmailNotVerified` or `PendingApproval` for accounts that are not active.
pub fn check_can_sign_in(status: AccountStatus) -> Result<(), AuthError> {
    match status {
        AccountStatus::PendingVerification => Err(AuthError::EmailNotVerified),
        AccountStatus::PendingApproval => Err(AuthError::PendingApproval),
        AccountStatus::Active => Ok(()),
    }
}

/// A missing expiry is treated as expired.
fn token_expired(expires: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    expires.is_none_or(|at| at < now)
}

/// 32 random bytes, URL-safe base64 without padding.
#[must_use]
pub fn generate_verification_token() -> String {
    let bytes: [u8; 32] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// # Errors
///
/// Returns `WeakPassword` when shorter than [`MIN_PASSWORD_LENGTH`] characters.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(MIN_PASSWORD_LENGTH));
    }
    Ok(())
}

fn validate_name(field: &'static str, value: &str) -> Result<String, AuthError> {
    let value = value.trim();
    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(AuthError::FieldTooLong(field, MAX_NAME_LENGTH));
    }
    Ok(value.to_owned())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input() -> RegistrationInput {
        RegistrationInput {
            username: "pss416".to_string(),
            email: "pss416@nyu.edu".to_string(),
            first_name: "Paul".to_string(),
            last_name: "Schlindwein".to_string(),
            password: "knicks-2017".to_string(),
            confirm_password: Some("knicks-2017".to_string()),
        }
    }

    #[test]
    fn test_valid_registration() {
        let valid = validate_registration(&input()).unwrap();
        assert_eq!(valid.username.as_str(), "pss416");
        assert_eq!(valid.email.as_str(), "pss416@nyu.edu");
    }

    #[test]
    fn test_missing_fields_reported_in_order() {
        let mut form = input();
        form.email = "  ".to_string();
        form.last_name = String::new();
        let err = validate_registration(&form).unwrap_err();
        assert_eq!(err.to_string(), "email is required");
    }

    #[test]
    fn test_password_mismatch() {
        let mut form = input();
        form.confirm_password = Some("knicks-2018".to_string());
        let err = validate_registration(&form).unwrap_err();
        assert!(matches!(err, AuthError::PasswordMismatch));
        assert_eq!(err.to_string(), "Passwords do not match");
    }

    #[test]
    fn test_mismatch_reported_before_missing_fields() {
        let form = RegistrationInput {
            password: "knicks-2017".to_string(),
            confirm_password: Some("knicks-2018".to_string()),
            ..RegistrationInput::default()
        };
        assert!(matches!(
            validate_registration(&form),
            Err(AuthError::PasswordMismatch)
        ));
    }

    #[test]
    fn test_mismatch_reported_before_length() {
        let mut form = input();
        form.password = "short".to_string();
        form.confirm_password = Some("shorter".to_string());
        assert!(matches!(
            validate_registration(&form),
            Err(AuthError::PasswordMismatch)
        ));
    }

    #[test]
    fn test_short_password_rejected() {
        let mut form = input();
        form.password = "seven77".to_string();
        form.confirm_password = Some("seven77".to_string());
        let err = validate_registration(&form).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Password must be at least 8 characters long"
        );
    }

    #[test]
    fn test_api_input_has_no_confirmation() {
        let mut form = input();
        form.confirm_password = None;
        assert!(validate_registration(&form).is_ok());
    }

    #[test]
    fn test_invalid_email_and_username() {
        let mut form = input();
        form.email = "not-an-email".to_string();
        assert!(matches!(
            validate_registration(&form),
            Err(AuthError::InvalidEmail(_))
        ));

        let mut form = input();
        form.username = "paul s".to_string();
        assert!(matches!(
            validate_registration(&form),
            Err(AuthError::InvalidUsername(_))
        ));
    }

    #[test]
    fn test_long_name_rejected() {
        let mut form = input();
        form.first_name = "P".repeat(51);
        assert!(matches!(
            validate_registration(&form),
            Err(AuthError::FieldTooLong("first_name", 50))
        ));
    }

    #[test]
    fn test_status_checks() {
        assert!(matches!(
            check_can_sign_in(AccountStatus::PendingVerification),
            Err(AuthError::EmailNotVerified)
        ));
        assert!(matches!(
            check_can_sign_in(AccountStatus::PendingApproval),
            Err(AuthError::PendingApproval)
        ));
        assert!(check_can_sign_in(AccountStatus::Active).is_ok());
    }

    #[test]
    fn test_token_expiry() {
        let now = Utc::now();
        assert!(!token_expired(Some(now + Duration::hours(1)), now));
        assert!(token_expired(Some(now - Duration::seconds(1)), now));
        assert!(token_expired(None, now));
    }

    #[test]
    fn test_verification_token_shape() {
        let a = generate_verification_token();
        let b = generate_verification_token();
        assert_eq!(a.len(), 43);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("hudson-river").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("hudson-river", &hash).is_ok());
        assert!(matches!(
            verify_password("hudson-rivers", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
