//! User repository for database operations.
//!
//! Runtime-checked queries over `portfolio."user"`. Rows are decoded into
//! [`UserRow`] and validated into [`User`] before they leave this module.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use pss_core::{Email, UserId, Username};

use super::RepositoryError;
use crate::models::user::{NewUser, User};

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, is_verified, \
                            is_approved, is_admin, created_at, last_login";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    is_verified: bool,
    is_approved: bool,
    is_admin: bool,
    created_at: DateTime<Utc>,
    last_login: Option<DateTime<Utc>>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&r.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;
        let email = Email::parse(&r.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        Ok(Self {
            id: r.id,
            username,
            email,
            first_name: r.first_name,
            last_name: r.last_name,
            is_verified: r.is_verified,
            is_approved: r.is_approved,
            is_admin: r.is_admin,
            created_at: r.created_at,
            last_login: r.last_login,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

#[derive(sqlx::FromRow)]
struct TokenRow {
    #[sqlx(flatten)]
    user: UserRow,
    email_verification_expires: Option<DateTime<Utc>>,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            r#"SELECT {USER_COLUMNS} FROM portfolio."user" WHERE id = $1"#
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            r#"SELECT {USER_COLUMNS} FROM portfolio."user" WHERE username = $1"#
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Fetch a user together with their password hash for sign-in.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row: Option<CredentialRow> = sqlx::query_as(&format!(
            r#"SELECT {USER_COLUMNS}, password_hash FROM portfolio."user" WHERE username = $1"#
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| User::try_from(r.user).map(|user| (user, r.password_hash)))
            .transpose()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn username_exists(&self, username: &str) -> Result<bool, RepositoryError> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"SELECT EXISTS(SELECT 1 FROM portfolio."user" WHERE username = $1)"#,
        )
        .bind(username)
        .fetch_one(self.pool)
        .await?;
        Ok(exists)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn email_exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"SELECT EXISTS(SELECT 1 FROM portfolio."user" WHERE email = $1)"#,
        )
        .bind(email)
        .fetch_one(self.pool)
        .await?;
        Ok(exists)
    }

    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` with the violated constraint name
    /// (`user_username_key` or `user_email_key`) on a duplicate.
    pub async fn create(&self, new: &NewUser) -> Result<User, RepositoryError> {
        let row: UserRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO portfolio."user"
                (username, email, password_hash, first_name, last_name,
                 email_verification_token, email_verification_expires,
                 is_verified, is_approved, is_admin)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(new.username.as_str())
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(new.verification_token.as_deref())
        .bind(new.verification_expires)
        .bind(new.is_verified)
        .bind(new.is_approved)
        .bind(new.is_admin)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_insert)?;

        User::try_from(row)
    }

    /// Look up the owner of a pending verification token and its expiry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_verification_token(
        &self,
        token: &str,
    ) -> Result<Option<(User, Option<DateTime<Utc>>)>, RepositoryError> {
        let row: Option<TokenRow> = sqlx::query_as(&format!(
            r#"
            SELECT {USER_COLUMNS}, email_verification_expires
            FROM portfolio."user"
            WHERE email_verification_token = $1
            "#
        ))
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| User::try_from(r.user).map(|user| (user, r.email_verification_expires)))
            .transpose()
    }

    /// Mark the email verified and clear the token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn mark_verified(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE portfolio."user"
            SET is_verified = TRUE,
                email_verification_token = NULL,
                email_verification_expires = NULL
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Verify and approve in one step (used by the CLI).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has that username.
    pub async fn activate(&self, username: &str) -> Result<User, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            r#"
            UPDATE portfolio."user"
            SET is_verified = TRUE,
                is_approved = TRUE,
                email_verification_token = NULL,
                email_verification_expires = NULL
            WHERE username = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound).and_then(User::try_from)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn set_approved(&self, id: UserId, approved: bool) -> Result<User, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            r#"
            UPDATE portfolio."user" SET is_approved = $2
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(approved)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound).and_then(User::try_from)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn record_login(&self, id: UserId) -> Result<(), RepositoryError> {
        sqlx::query(r#"UPDATE portfolio."user" SET last_login = NOW() WHERE id = $1"#)
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// All users, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            r#"SELECT {USER_COLUMNS} FROM portfolio."user" ORDER BY created_at DESC, id DESC"#
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }
}
