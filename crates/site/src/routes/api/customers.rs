//! Customer analytics endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Serialize;
use tracing::instrument;

use pss_core::{CustomerId, PageInfo};

use crate::db::{CampaignRepository, CustomerRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{Campaign, Customer, CustomerDetail, DashboardStats};
use crate::routes::customers::CustomerQuery;
use crate::state::AppState;

/// `{customers, total, pages, current_page, per_page}`
#[derive(Debug, Serialize)]
pub struct CustomerListResponse {
    pub customers: Vec<Customer>,
    #[serde(flatten)]
    pub info: PageInfo,
}

#[derive(Debug, Serialize)]
pub struct CampaignListResponse {
    pub campaigns: Vec<Campaign>,
}

/// `GET /api/customers?page&per_page&search`
///
/// # Errors
///
/// 500 on database failure.
#[instrument(skip(state, _user))]
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Query(query): Query<CustomerQuery>,
) -> Result<Json<CustomerListResponse>> {
    let page = CustomerRepository::new(state.pool())
        .search(query.search_term(), query.page_request())
        .await?;
    Ok(Json(CustomerListResponse {
        customers: page.customers,
        info: page.info,
    }))
}

/// `GET /api/customers/{id}`
///
/// # Errors
///
/// 404 for an unknown customer.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<CustomerId>,
) -> Result<Json<CustomerDetail>> {
    CustomerRepository::new(state.pool())
        .detail(id)
        .await
        .map(Json)
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Customer not found".to_string()),
            other => AppError::Database(other),
        })
}

/// `GET /api/campaigns`
///
/// # Errors
///
/// 500 on database failure.
pub async fn campaigns(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> Result<Json<CampaignListResponse>> {
    let campaigns = CampaignRepository::new(state.pool()).list().await?;
    Ok(Json(CampaignListResponse { campaigns }))
}

/// `GET /api/dashboard/stats`
///
/// # Errors
///
/// 500 on database failure.
pub async fn stats(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> Result<Json<DashboardStats>> {
    Ok(Json(CustomerRepository::new(state.pool()).stats().await?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pss_core::PageRequest;

    #[test]
    fn test_list_envelope_is_flat() {
        let body = CustomerListResponse {
            customers: Vec::new(),
            info: PageInfo::new(120, PageRequest::new(Some(2), Some(50))),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["total"], 120);
        assert_eq!(json["pages"], 3);
        assert_eq!(json["current_page"], 2);
        assert_eq!(json["per_page"], 50);
        assert!(json["customers"].as_array().unwrap().is_empty());
    }
}
