//! The full router driven in-process.
//!
//! The pool points at a closed port unless a test is `#[ignore]`d and run
//! with `PSS_TEST_DATABASE_URL`, so most of these cover everything that
//! happens before (or instead of) a query.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use pss_integration_tests::{
    TestApp, get, get_with_cookie, post_form, post_json, session_user, test_database_url,
};

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_is_ok_without_database() {
    let app = TestApp::offline();
    let res = app.send(get("/health")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, "ok");
}

#[tokio::test]
async fn test_readiness_reports_unreachable_database() {
    let app = TestApp::offline();
    let res = app.send(get("/health/ready")).await;
    assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);
}

// ============================================================================
// Public pages and headers
// ============================================================================

#[tokio::test]
async fn test_home_style_nonce_matches_policy() {
    let app = TestApp::offline();
    let res = app.send(get("/")).await;
    assert_eq!(res.status, StatusCode::OK);

    let csp = res.header("content-security-policy").unwrap();
    let nonce = csp
        .split("'nonce-")
        .nth(1)
        .and_then(|rest| rest.split('\'').next())
        .unwrap();
    assert!(res.body.contains(&format!(r#"<style nonce="{nonce}">"#)));
    assert!(res.body.contains("PAUL SCHLINDWEIN"));
    assert!(res.body.contains("Continue as Guest"));
}

#[tokio::test]
async fn test_security_headers_and_request_id() {
    let app = TestApp::offline();
    let res = app.send(get("/about")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.header("x-frame-options"), Some("DENY"));
    assert_eq!(res.header("x-content-type-options"), Some("nosniff"));
    assert!(res.header("x-request-id").is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn test_portfolio_pages_render() {
    let app = TestApp::offline();
    for path in ["/about", "/interests", "/sports", "/finance", "/projects", "/contact"] {
        let res = app.send(get(path)).await;
        assert_eq!(res.status, StatusCode::OK, "{path}");
        assert!(res.body.contains("PSS III"), "{path}");
    }
}

#[tokio::test]
async fn test_unknown_page_is_html_404() {
    let app = TestApp::offline();
    let res = app.send(get("/no-such-page")).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert!(res.body.contains("error-code"));
}

#[tokio::test]
async fn test_static_stylesheet_is_served() {
    let app = TestApp::offline();
    let res = app.send(get("/static/css/main.css")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("@keyframes intro-in"));
}

#[tokio::test]
async fn test_search_script_keeps_page_size_and_rejects_failed_responses() {
    let app = TestApp::offline();
    let res = app.send(get("/static/js/customers.js")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains(r#"params.set("per_page", perPage)"#));
    assert!(res.body.contains("if (!response.ok)"));
}

// ============================================================================
// Guards
// ============================================================================

#[tokio::test]
async fn test_signed_out_page_redirects_to_signin() {
    let app = TestApp::offline();
    for path in ["/dashboard", "/customers", "/admin"] {
        let res = app.send(get(path)).await;
        assert_eq!(res.status, StatusCode::SEE_OTHER, "{path}");
        assert_eq!(res.header("location"), Some("/signin"), "{path}");
    }
}

#[tokio::test]
async fn test_signed_out_api_is_401_json() {
    let app = TestApp::offline();
    let res = app.send(get("/api/user")).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json(), json!({ "error": "Authentication required" }));
}

#[tokio::test]
async fn test_non_admin_api_is_403() {
    let app = TestApp::offline();
    let cookie = app.sign_in_as(&session_user(false)).await;
    let res = app.send(get_with_cookie("/api/admin/users", &cookie)).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.json(), json!({ "error": "Admin access required" }));
}

#[tokio::test]
async fn test_admin_approval_requires_admin_and_reports_failure() {
    let app = TestApp::offline();

    let member = app.sign_in_as(&session_user(false)).await;
    for path in ["/api/admin/users/7/approve", "/api/admin/users/7/reject"] {
        let res = app.send(post_json(path, &json!({}), Some(&member))).await;
        assert_eq!(res.status, StatusCode::FORBIDDEN, "{path}");
    }

    let admin = app.sign_in_as(&session_user(true)).await;
    for path in ["/api/admin/users/7/approve", "/api/admin/users/7/reject"] {
        let res = app.send(post_json(path, &json!({}), Some(&admin))).await;
        assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR, "{path}");
        assert_eq!(res.json(), json!({ "error": "Internal server error" }));
    }
}

#[tokio::test]
async fn test_signed_in_dashboard_shows_profile() {
    let app = TestApp::offline();
    let cookie = app.sign_in_as(&session_user(false)).await;
    let res = app.send(get_with_cookie("/dashboard", &cookie)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("Paul"));
    assert!(res.body.contains("PS"));
    assert!(!res.body.contains(r#"href="/admin""#));
}

#[tokio::test]
async fn test_admin_sees_admin_link() {
    let app = TestApp::offline();
    let cookie = app.sign_in_as(&session_user(true)).await;
    let res = app.send(get_with_cookie("/dashboard", &cookie)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains(r#"href="/admin""#));
}

// ============================================================================
// JSON API
// ============================================================================

#[tokio::test]
async fn test_ping() {
    let app = TestApp::offline();
    let res = app.send(get("/api/ping")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json(), json!({ "message": "pong" }));
}

#[tokio::test]
async fn test_unknown_api_path_is_json_404() {
    let app = TestApp::offline();
    let res = app.send(get("/api/nothing-here")).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json(), json!({ "error": "Not found" }));
}

#[tokio::test]
async fn test_api_register_reports_missing_field() {
    let app = TestApp::offline();
    let body = json!({
        "username": "pss416",
        "email": "pss416@nyu.edu",
        "password": "correct horse",
        "first_name": "Paul",
    });
    let res = app.send(post_json("/api/register", &body, None)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json(), json!({ "error": "last_name is required" }));
}

#[tokio::test]
async fn test_api_login_requires_credentials() {
    let app = TestApp::offline();
    let res = app
        .send(post_json("/api/login", &json!({ "username": "pss416" }), None))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        res.json(),
        json!({ "error": "Username and password are required" })
    );
}

#[tokio::test]
async fn test_api_login_is_rate_limited() {
    let app = TestApp::offline();
    let body = json!({});
    for _ in 0..5 {
        let res = app.send(post_json("/api/login", &body, None)).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
    }
    let res = app.send(post_json("/api/login", &body, None)).await;
    assert_eq!(res.status, StatusCode::TOO_MANY_REQUESTS);
}

// ============================================================================
// HTML forms
// ============================================================================

#[tokio::test]
async fn test_register_form_reports_mismatch_first() {
    let app = TestApp::offline();
    let res = app
        .send(post_form(
            "/register",
            &[
                ("username", "pss416"),
                ("email", "not-an-email"),
                ("first_name", "Paul"),
                ("last_name", ""),
                ("password", "secret-one"),
                ("confirm_password", "secret-two"),
            ],
        ))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body.contains("Passwords do not match"));
    assert!(res.body.contains(r#"value="pss416""#));
    assert!(!res.body.contains("secret-one"));
}

#[tokio::test]
async fn test_register_form_rejects_short_password() {
    let app = TestApp::offline();
    let res = app
        .send(post_form(
            "/register",
            &[
                ("username", "pss416"),
                ("email", "pss416@nyu.edu"),
                ("first_name", "Paul"),
                ("last_name", "Schlindwein"),
                ("password", "short"),
                ("confirm_password", "short"),
            ],
        ))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body.contains("Password must be at least 8 characters long"));
}

#[tokio::test]
async fn test_signin_page_shows_remember_me() {
    let app = TestApp::offline();
    let res = app.send(get("/signin")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains(r#"name="remember_me""#));
}

#[tokio::test]
async fn test_signin_shows_notice_after_verification_link() {
    let app = TestApp::offline();
    let res = app.send(get("/signin?verified=1")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("Email verified successfully! You can now log in."));
}

// ============================================================================
// Customers
// ============================================================================

#[tokio::test]
async fn test_customers_shows_error_panel_when_database_fails() {
    let app = TestApp::offline();
    let cookie = app.sign_in_as(&session_user(false)).await;
    let res = app.send(get_with_cookie("/customers", &cookie)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("Failed to fetch customers"));
    assert!(res.body.contains(r#"data-debounce-ms="500""#));
    assert!(res.body.contains("/static/js/customers.js"));
    // Stats cards are hidden rather than shown empty.
    assert!(!res.body.contains("card-value"));
}

#[tokio::test]
async fn test_customers_page_keeps_requested_page_size() {
    let app = TestApp::offline();
    let cookie = app.sign_in_as(&session_user(false)).await;
    let res = app
        .send(get_with_cookie("/customers?per_page=10&search=ann", &cookie))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains(r#"data-per-page="10""#));
    assert!(res.body.contains(r#"name="per_page" value="10""#));
}

#[tokio::test]
async fn test_customers_fragment_has_no_layout() {
    let app = TestApp::offline();
    let cookie = app.sign_in_as(&session_user(false)).await;
    let res = app
        .send(get_with_cookie("/customers/table?search=smith&page=2", &cookie))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("error-panel"));
    assert!(!res.body.contains("<html"));
}

// ============================================================================
// Database-backed flows
// ============================================================================

/// Usernames must be unique per run against a shared database.
fn unique_username() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("it_{}", &suffix[..12])
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (PSS_TEST_DATABASE_URL)"]
async fn test_register_verify_and_login() {
    let url = test_database_url().unwrap();
    let app = TestApp::new(&url);
    let username = unique_username();
    let password = "integration-pass";

    let res = app
        .send(post_json(
            "/api/register",
            &json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": password,
                "first_name": "Integration",
                "last_name": "Test",
            }),
            None,
        ))
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    let user_id = res.json()["user_id"].as_i64().unwrap();

    let credentials = json!({ "username": username, "password": password });
    let res = app.send(post_json("/api/login", &credentials, None)).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        res.json(),
        json!({ "error": "Please verify your email before logging in" })
    );

    sqlx::query(
        r#"UPDATE portfolio."user"
         SET is_verified = TRUE, is_approved = TRUE, email_verification_token = NULL
         WHERE id = $1"#,
    )
    .bind(user_id)
    .execute(app.state.pool())
    .await
    .unwrap();

    let res = app.send(post_json("/api/login", &credentials, None)).await;
    assert_eq!(res.status, StatusCode::OK);
    let cookie = res.session_cookie().unwrap();

    let res = app.send(get_with_cookie("/api/user", &cookie)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["username"], json!(username));
    assert_eq!(res.json()["is_verified"], json!(true));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (PSS_TEST_DATABASE_URL)"]
async fn test_customers_api_envelope() {
    let url = test_database_url().unwrap();
    let app = TestApp::new(&url);
    let cookie = app.sign_in_as(&session_user(false)).await;

    let res = app
        .send(get_with_cookie("/api/customers?page=1&per_page=5", &cookie))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert!(body["customers"].is_array());
    assert!(body["customers"].as_array().unwrap().len() <= 5);
    assert_eq!(body["current_page"], json!(1));
    assert_eq!(body["per_page"], json!(5));
    assert!(body["total"].is_number());
}
