//! Subcommand implementations.

pub mod admin;
pub mod migrate;
pub mod seed;
pub mod user;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use pss_site::db::RepositoryError;
use pss_site::services::auth::AuthError;

/// Errors shared by every subcommand.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("{0}")]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Repository(#[from] RepositoryError),

    #[error("User '{0}' not found")]
    UserNotFound(String),

    #[error("Invalid seed size: {0}")]
    InvalidSeedSize(&'static str),
}

/// Connect using the same variables as the site.
pub(crate) async fn connect() -> Result<PgPool, CliError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("PSS_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CliError::MissingEnvVar("PSS_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(pss_site::db::create_pool(&database_url).await?)
}
