//! Campaign repository.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::Campaign;

pub struct CampaignRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CampaignRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every campaign, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Campaign>, RepositoryError> {
        let campaigns = sqlx::query_as(
            r"
            SELECT campaign_id, campaign_name, utm_source, utm_medium, utm_campaign,
                   ad_keyword, creative_asset, start_date, ad_spend
            FROM portfolio.campaign
            ORDER BY campaign_id
            ",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(campaigns)
    }
}
