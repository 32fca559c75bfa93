//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::SiteConfig;
use crate::content::{ContentError, ContentStore};
use crate::services::email::{EmailError, EmailService};

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("content: {0}")]
    Content(#[from] ContentError),
    #[error("email: {0}")]
    Email(#[from] EmailError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    pool: PgPool,
    content: ContentStore,
    email: EmailService,
}

impl AppState {
    /// Build state from configuration, loading content pages from
    /// `config.content_dir` and the SMTP transport from `config.email`.
    ///
    /// # Errors
    ///
    /// Returns an error if the content directory cannot be read or the SMTP
    /// settings are invalid.
    pub fn new(config: SiteConfig, pool: PgPool) -> Result<Self, StateError> {
        let content = ContentStore::load(&config.content_dir)?;
        let email = EmailService::new(&config)?;
        Ok(Self::from_parts(config, pool, content, email))
    }

    /// Assemble state from already-built parts.
    #[must_use]
    pub fn from_parts(
        config: SiteConfig,
        pool: PgPool,
        content: ContentStore,
        email: EmailService,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                content,
                email,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn content(&self) -> &ContentStore {
        &self.inner.content
    }

    #[must_use]
    pub fn email(&self) -> &EmailService {
        &self.inner.email
    }
}
