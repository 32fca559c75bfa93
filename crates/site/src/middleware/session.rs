//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions.

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "pss_session";

/// Inactivity expiry for a normal sign-in (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Inactivity expiry when "remember me" is ticked (30 days).
pub const REMEMBER_ME_EXPIRY_SECONDS: i64 = 30 * 24 * 60 * 60;

/// Build the `PostgreSQL` session store in `portfolio.session`.
///
/// The table is created by the site migrations, not by the store.
///
/// # Errors
///
/// Returns the store's validation message if the schema or table name is
/// rejected.
pub fn postgres_store(pool: &PgPool) -> Result<PostgresStore, String> {
    PostgresStore::new(pool.clone())
        .with_schema_name("portfolio")?
        .with_table_name("session")
}

/// Create the session layer around any store.
///
/// `secure` should be true when the site is served over HTTPS.
#[must_use]
pub fn create_session_layer<S>(store: S, secure: bool) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(session_expiry(false))
        .with_secure(secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Inactivity expiry for a session, longer with "remember me".
#[must_use]
pub const fn session_expiry(remember_me: bool) -> Expiry {
    let seconds = if remember_me {
        REMEMBER_ME_EXPIRY_SECONDS
    } else {
        SESSION_EXPIRY_SECONDS
    };
    Expiry::OnInactivity(tower_sessions::cookie::time::Duration::seconds(seconds))
}
