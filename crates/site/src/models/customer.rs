//! Customer analytics domain types.
//!
//! Money columns are `NUMERIC` in Postgres and [`Decimal`] here, but go out
//! over the JSON API as plain numbers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use pss_core::{CampaignId, CustomerId, DeviceType, FinancialId, SaleId, TouchpointId};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Customer {
    pub customer_id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub device_type: DeviceType,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Campaign {
    pub campaign_id: CampaignId,
    pub campaign_name: String,
    pub utm_source: String,
    pub utm_medium: String,
    pub utm_campaign: String,
    pub ad_keyword: String,
    pub creative_asset: String,
    pub start_date: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::float")]
    pub ad_spend: Decimal,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Touchpoint {
    pub touchpoint_id: TouchpointId,
    pub touchpoint_type: String,
    pub touchpoint_detail: String,
    pub interaction_date: DateTime<Utc>,
    pub device_type: DeviceType,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SalesMetric {
    pub sale_id: SaleId,
    pub campaign_id: CampaignId,
    pub conversion_stage: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub deal_size: Decimal,
    pub sale_date: DateTime<Utc>,
    pub won: bool,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct FinancialMetric {
    pub financial_id: FinancialId,
    pub campaign_id: CampaignId,
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
    /// Customer acquisition cost
    #[serde(with = "rust_decimal::serde::float")]
    pub cac: Decimal,
    /// Customer lifetime value
    #[serde(with = "rust_decimal::serde::float")]
    pub cltv: Decimal,
    /// Cost per click
    #[serde(with = "rust_decimal::serde::float")]
    pub cpc: Decimal,
    /// Cost per conversion
    #[serde(with = "rust_decimal::serde::float")]
    pub cpcv: Decimal,
    /// Average contract value
    #[serde(with = "rust_decimal::serde::float")]
    pub acv: Decimal,
}

/// A customer with the most recent rows from each child table.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerDetail {
    pub customer: Customer,
    pub touchpoints: Vec<Touchpoint>,
    pub sales_metrics: Vec<SalesMetric>,
    pub financial_metrics: Vec<FinancialMetric>,
}

/// Headline numbers for the dashboard and the customers page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_customers: i64,
    pub total_campaigns: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_revenue: Decimal,
    pub total_interactions: i64,
    /// Customers created in the last 30 days
    pub recent_customers: i64,
}
