//! Customer analytics pages.
//!
//! `/customers` renders the stats cards, search box and first page of the
//! table. The search box is wired to `static/js/customers.js`, which fetches
//! `/customers/table` once typing has paused for [`SEARCH_DEBOUNCE_MS`].

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use pss_core::{CustomerId, PageRequest};

use crate::db::customers::CustomerPage;
use crate::db::{CustomerRepository, RepositoryError};
use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, CustomerDetail, DashboardStats};
use crate::state::AppState;

use super::{internal_error, not_found};

/// Quiet period after the last keystroke before a search is sent.
pub const SEARCH_DEBOUNCE_MS: u64 = 500;

/// Shown in place of the table when the customer query fails.
pub const FETCH_ERROR: &str = "Failed to fetch customers";

/// Query string accepted by the customer list page, fragment, and API.
///
/// Numbers are parsed leniently: anything that is not an integer falls back
/// to the default, the same as leaving it out.
#[derive(Debug, Default, Deserialize)]
pub struct CustomerQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub search: Option<String>,
}

impl CustomerQuery {
    #[must_use]
    pub fn page_request(&self) -> PageRequest {
        let parse = |v: &Option<String>| v.as_deref().and_then(|s| s.trim().parse::<i64>().ok());
        PageRequest::new(parse(&self.page), parse(&self.per_page))
    }

    /// The trimmed search term, or `None` when blank.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Table plus pager. Rendered inside the full page and on its own for the
/// search script.
#[derive(Template, WebTemplate)]
#[template(path = "customers/table.html")]
pub struct CustomersTableTemplate {
    pub page: Option<CustomerPage>,
    pub error: Option<String>,
    pub search: String,
    /// `search` encoded for use in pager links
    pub search_param: String,
    /// Carried through pager links so every page has the same size.
    pub per_page: u32,
}

#[derive(Template, WebTemplate)]
#[template(path = "customers/index.html")]
pub struct CustomersTemplate {
    pub current_user: Option<CurrentUser>,
    pub stats: Option<DashboardStats>,
    pub debounce_ms: u64,
    pub page: Option<CustomerPage>,
    pub error: Option<String>,
    pub search: String,
    pub search_param: String,
    pub per_page: u32,
}

#[derive(Template, WebTemplate)]
#[template(path = "customers/detail.html")]
pub struct CustomerDetailTemplate {
    pub current_user: Option<CurrentUser>,
    pub detail: CustomerDetail,
}

/// Run the search and turn a failure into the error panel.
async fn load_table(state: &AppState, query: &CustomerQuery) -> CustomersTableTemplate {
    let search = query.search_term().unwrap_or_default().to_string();
    let search_param = url::form_urlencoded::byte_serialize(search.as_bytes()).collect();

    let request = query.page_request();
    let (page, error) = match CustomerRepository::new(state.pool())
        .search(query.search_term(), request)
        .await
    {
        Ok(page) => (Some(page), None),
        Err(e) => {
            let event_id = sentry::capture_error(&e);
            tracing::error!(error = %e, sentry_event_id = %event_id, "Customer search failed");
            (None, Some(FETCH_ERROR.to_string()))
        }
    };

    CustomersTableTemplate {
        page,
        error,
        search,
        search_param,
        per_page: request.per_page(),
    }
}

/// Full customers page.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<CustomerQuery>,
) -> impl IntoResponse {
    let table = load_table(&state, &query).await;

    // The page still works without the cards.
    let stats = match CustomerRepository::new(state.pool()).stats().await {
        Ok(stats) => Some(stats),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load customer stats");
            None
        }
    };

    CustomersTemplate {
        current_user: Some(user),
        stats,
        debounce_ms: SEARCH_DEBOUNCE_MS,
        page: table.page,
        error: table.error,
        search: table.search,
        search_param: table.search_param,
        per_page: table.per_page,
    }
}

/// Table fragment for the debounced search.
#[instrument(skip_all)]
pub async fn table(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Query(query): Query<CustomerQuery>,
) -> impl IntoResponse {
    if let Some(term) = query.search_term() {
        add_breadcrumb("customers", "Searched customers", Some(&[("search", term)]));
    }
    load_table(&state, &query).await
}

/// One customer with their recent touchpoints, sales and financials.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<CustomerId>,
) -> Response {
    match CustomerRepository::new(state.pool()).detail(id).await {
        Ok(detail) => CustomerDetailTemplate {
            current_user: Some(user),
            detail,
        }
        .into_response(),
        Err(RepositoryError::NotFound) => not_found(Some(user)),
        Err(e) => internal_error(&e, Some(user)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pss_core::{DeviceType, PageInfo};

    use crate::models::Customer;

    fn query(page: Option<&str>, per_page: Option<&str>, search: Option<&str>) -> CustomerQuery {
        CustomerQuery {
            page: page.map(String::from),
            per_page: per_page.map(String::from),
            search: search.map(String::from),
        }
    }

    #[test]
    fn test_query_parsing_is_lenient() {
        let req = query(Some("abc"), Some("25"), None).page_request();
        assert_eq!((req.page(), req.per_page()), (1, 25));

        let req = query(Some(" 3 "), None, None).page_request();
        assert_eq!((req.page(), req.per_page()), (3, 50));
    }

    #[test]
    fn test_blank_search_is_none() {
        assert_eq!(query(None, None, Some("   ")).search_term(), None);
        assert_eq!(query(None, None, Some(" Ann ")).search_term(), Some("Ann"));
    }

    #[test]
    fn test_error_panel_replaces_table() {
        let html = CustomersTableTemplate {
            page: None,
            error: Some(FETCH_ERROR.to_string()),
            search: String::new(),
            search_param: String::new(),
            per_page: 50,
        }
        .render()
        .unwrap();
        assert!(html.contains("Failed to fetch customers"));
        assert!(!html.contains("<table"));
    }

    #[test]
    fn test_table_renders_rows_and_pager() {
        let req = PageRequest::new(Some(2), Some(1));
        let html = CustomersTableTemplate {
            page: Some(CustomerPage {
                customers: vec![Customer {
                    customer_id: CustomerId::new(2),
                    first_name: "First2".into(),
                    last_name: "Last2".into(),
                    email: "user2@example.com".into(),
                    device_type: DeviceType::Mobile,
                    created_at: Utc::now(),
                }],
                info: PageInfo::new(3, req),
            }),
            error: None,
            search: "a b".into(),
            search_param: "a+b".into(),
            per_page: req.per_page(),
        }
        .render()
        .unwrap();
        assert!(html.contains("user2@example.com"));
        assert!(html.contains("badge-mobile"));
        assert!(html.contains("/customers?page=1&search=a+b&per_page=1"));
        assert!(html.contains("Page 2 of 3"));
    }

    #[test]
    fn test_pager_keeps_page_size() {
        let req = query(None, Some("10"), Some("smith")).page_request();
        let html = CustomersTableTemplate {
            page: Some(CustomerPage {
                customers: Vec::new(),
                info: PageInfo::new(30, req),
            }),
            error: None,
            search: "smith".into(),
            search_param: "smith".into(),
            per_page: req.per_page(),
        }
        .render()
        .unwrap();
        assert!(html.contains(r#"href="/customers?page=2&search=smith&per_page=10" data-page="2">Next"#));
        assert!(html.contains("Page 1 of 3"));
    }

    #[test]
    fn test_page_carries_debounce_attribute() {
        let html = CustomersTemplate {
            current_user: None,
            stats: Some(DashboardStats::default()),
            debounce_ms: SEARCH_DEBOUNCE_MS,
            page: None,
            error: None,
            search: String::new(),
            search_param: String::new(),
            per_page: 50,
        }
        .render()
        .unwrap();
        assert!(html.contains(r#"data-debounce-ms="500""#));
        assert!(html.contains(r#"data-per-page="50""#));
        assert!(html.contains("/static/js/customers.js"));
    }
}
