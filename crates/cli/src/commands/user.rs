//! User inspection and manual activation.

use pss_core::AccountStatus;
use pss_site::db::UserRepository;
use pss_site::models::User;

use super::{CliError, connect};

fn summary(user: &User) -> String {
    format!(
        "{:>5}  {:<20} {:<32} {:<22}{}",
        user.id,
        user.username,
        user.email,
        user.status().label(),
        if user.is_admin { "  admin" } else { "" }
    )
}

/// Print every account, newest first.
///
/// # Errors
///
/// Returns `CliError` if the database query fails.
#[allow(clippy::print_stdout)]
pub async fn list() -> Result<(), CliError> {
    let pool = connect().await?;
    let users = UserRepository::new(&pool).list().await?;

    if users.is_empty() {
        println!("No users.");
        return Ok(());
    }
    for user in &users {
        println!("{}", summary(user));
    }
    println!("{} users", users.len());
    Ok(())
}

/// Mark an account verified and approved.
///
/// # Errors
///
/// Returns `CliError::UserNotFound` for an unknown username.
pub async fn verify(username: &str) -> Result<(), CliError> {
    let pool = connect().await?;
    let users = UserRepository::new(&pool);

    let user = users
        .get_by_username(username)
        .await?
        .ok_or_else(|| CliError::UserNotFound(username.to_owned()))?;

    if user.status() == AccountStatus::Active {
        tracing::info!("User '{}' is already verified and approved", username);
        return Ok(());
    }

    let user = users.activate(username).await?;
    tracing::info!(
        "User '{}' verified and approved ({}, {})",
        user.username,
        user.email,
        user.full_name()
    );
    Ok(())
}

/// Print one account in detail.
///
/// # Errors
///
/// Returns `CliError::UserNotFound` for an unknown username.
#[allow(clippy::print_stdout)]
pub async fn show(username: &str) -> Result<(), CliError> {
    let pool = connect().await?;
    let user = UserRepository::new(&pool)
        .get_by_username(username)
        .await?
        .ok_or_else(|| CliError::UserNotFound(username.to_owned()))?;

    println!("ID:         {}", user.id);
    println!("Username:   {}", user.username);
    println!("Name:       {}", user.full_name());
    println!("Email:      {}", user.email);
    println!("Status:     {}", user.status().label());
    println!("Admin:      {}", if user.is_admin { "yes" } else { "no" });
    println!("Registered: {}", user.created_at.to_rfc3339());
    println!(
        "Last login: {}",
        user.last_login
            .map_or_else(|| "never".to_owned(), |t| t.to_rfc3339())
    );
    Ok(())
}
