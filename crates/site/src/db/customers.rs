//! Customer repository: paged search, detail view, and dashboard totals.

use rust_decimal::Decimal;
use sqlx::PgPool;

use pss_core::{CustomerId, PageInfo, PageRequest};

use super::{RepositoryError, escape_like};
use crate::models::{
    Customer, CustomerDetail, DashboardStats, FinancialMetric, SalesMetric, Touchpoint,
};

/// Rows shown per child table on the customer detail view.
pub const DETAIL_CHILD_LIMIT: i64 = 10;

/// Filter shared by the count and page queries. `$1` is the escaped
/// `ILIKE` pattern, or NULL for no search.
const SEARCH_FILTER: &str = r"
    ($1::text IS NULL
     OR first_name ILIKE $1
     OR last_name ILIKE $1
     OR email ILIKE $1)
";

/// One page of customers plus the totals describing it.
#[derive(Debug, Clone)]
pub struct CustomerPage {
    pub customers: Vec<Customer>,
    pub info: PageInfo,
}

pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Case-insensitive substring search over first name, last name and
    /// email, ordered by `customer_id`. A blank search returns everything.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either query fails.
    pub async fn search(
        &self,
        search: Option<&str>,
        request: PageRequest,
    ) -> Result<CustomerPage, RepositoryError> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", escape_like(s)));

        let (total,): (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM portfolio.customer WHERE {SEARCH_FILTER}"
        ))
        .bind(pattern.as_deref())
        .fetch_one(self.pool)
        .await?;

        let customers: Vec<Customer> = sqlx::query_as(&format!(
            r"
            SELECT customer_id, first_name, last_name, email, device_type, created_at
            FROM portfolio.customer
            WHERE {SEARCH_FILTER}
            ORDER BY customer_id
            LIMIT $2 OFFSET $3
            "
        ))
        .bind(pattern.as_deref())
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(self.pool)
        .await?;

        tracing::debug!(total, returned = customers.len(), "Customer search");

        Ok(CustomerPage {
            customers,
            info: PageInfo::new(total, request),
        })
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let customer = sqlx::query_as(
            r"
            SELECT customer_id, first_name, last_name, email, device_type, created_at
            FROM portfolio.customer
            WHERE customer_id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(customer)
    }

    /// A customer with up to [`DETAIL_CHILD_LIMIT`] of their most recent
    /// touchpoints, sales, and financial rows.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer does not exist.
    pub async fn detail(&self, id: CustomerId) -> Result<CustomerDetail, RepositoryError> {
        let customer = self.get(id).await?.ok_or(RepositoryError::NotFound)?;

        let touchpoints: Vec<Touchpoint> = sqlx::query_as(
            r"
            SELECT touchpoint_id, touchpoint_type, touchpoint_detail, interaction_date, device_type
            FROM portfolio.touchpoint
            WHERE customer_id = $1
            ORDER BY interaction_date DESC, touchpoint_id DESC
            LIMIT $2
            ",
        )
        .bind(id)
        .bind(DETAIL_CHILD_LIMIT)
        .fetch_all(self.pool)
        .await?;

        let sales_metrics: Vec<SalesMetric> = sqlx::query_as(
            r"
            SELECT sale_id, campaign_id, conversion_stage, deal_size, sale_date, won
            FROM portfolio.sales_metric
            WHERE customer_id = $1
            ORDER BY sale_date DESC, sale_id DESC
            LIMIT $2
            ",
        )
        .bind(id)
        .bind(DETAIL_CHILD_LIMIT)
        .fetch_all(self.pool)
        .await?;

        let financial_metrics: Vec<FinancialMetric> = sqlx::query_as(
            r"
            SELECT financial_id, campaign_id, revenue, cac, cltv, cpc, cpcv, acv
            FROM portfolio.financial_metric
            WHERE customer_id = $1
            ORDER BY financial_id DESC
            LIMIT $2
            ",
        )
        .bind(id)
        .bind(DETAIL_CHILD_LIMIT)
        .fetch_all(self.pool)
        .await?;

        Ok(CustomerDetail {
            customer,
            touchpoints,
            sales_metrics,
            financial_metrics,
        })
    }

    /// Totals for the dashboard. Revenue is summed across all financial
    /// rows; "recent" means created in the last 30 days.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stats(&self) -> Result<DashboardStats, RepositoryError> {
        let (total_customers, total_campaigns, total_revenue, total_interactions, recent_customers): (
            i64,
            i64,
            Option<Decimal>,
            i64,
            i64,
        ) = sqlx::query_as(
            r"
            SELECT
                (SELECT COUNT(*) FROM portfolio.customer),
                (SELECT COUNT(*) FROM portfolio.campaign),
                (SELECT SUM(revenue) FROM portfolio.financial_metric),
                (SELECT COUNT(*) FROM portfolio.interaction),
                (SELECT COUNT(*) FROM portfolio.customer
                 WHERE created_at >= NOW() - INTERVAL '30 days')
            ",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(DashboardStats {
            total_customers,
            total_campaigns,
            total_revenue: total_revenue.unwrap_or_default(),
            total_interactions,
            recent_customers,
        })
    }
}
