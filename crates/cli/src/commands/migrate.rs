//! Database migration command.
//!
//! Migrations live in `crates/site/migrations/` and are embedded at compile
//! time. The site never runs them on startup.

use super::{CliError, connect};

/// Apply all pending site migrations.
///
/// # Errors
///
/// Returns `CliError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!("Running site migrations...");
    sqlx::migrate!("../site/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
