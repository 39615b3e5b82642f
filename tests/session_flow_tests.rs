mod common;

use axum::http::StatusCode;
use common::{
    app, assert_redirect, body_string, clears_cookie, get, location, post_form, session_cookie, set_cookies,
};
use edu_portal::{MockEduApi, api::ApiError};
use reqwest::Method;
use serde_json::json;

// --- Login ---

#[tokio::test]
async fn test_login_persists_session_and_lands_on_role_home() {
    let api = MockEduApi::new().reply_json(
        Method::POST,
        "/auth/token",
        json!({ "access_token": "tok-123", "token_type": "bearer", "role": "teacher" }),
    );
    let app = app(&api);

    let response = post_form(&app, "/login", None, "username=li&password=secret").await;
    assert_redirect(&response, "/teacher");

    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("token=tok-123")));
    assert!(cookies.iter().any(|c| c.starts_with("role=teacher")));
    assert!(cookies.iter().any(|c| c.starts_with("username=li")));
    assert!(cookies.iter().all(|c| c.contains("HttpOnly")));

    // Credentials go out form-encoded, without a bearer token.
    let calls = api.calls_to(Method::POST, "/auth/token");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].body, json!({ "username": "li", "password": "secret" }));
    assert_eq!(calls[0].token, None);
}

#[tokio::test]
async fn test_login_without_role_asks_profile_endpoint() {
    let api = MockEduApi::new()
        .reply_json(Method::POST, "/auth/token", json!({ "access_token": "tok-9" }))
        .reply_json(
            Method::GET,
            "/auth/me",
            json!({ "id": 4, "username": "root", "role": "admin" }),
        );
    let app = app(&api);

    let response = post_form(&app, "/login", None, "username=root&password=pw").await;
    assert_redirect(&response, "/admin");
    assert_eq!(
        api.calls_to(Method::GET, "/auth/me")[0].token.as_deref(),
        Some("tok-9")
    );
}

#[tokio::test]
async fn test_failed_login_shows_generic_error_and_sets_nothing() {
    let api = MockEduApi::new().reply_error(
        Method::POST,
        "/auth/token",
        ApiError::Status {
            status: 400,
            detail: Some("Incorrect username or password".to_string()),
        },
    );
    let app = app(&api);

    let response = post_form(&app, "/login", None, "username=li&password=wrong").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookies(&response).is_empty());
    let html = body_string(response).await;
    assert!(html.contains("Invalid username or password"));
    assert!(html.contains("value=\"li\""));
}

#[tokio::test]
async fn test_login_page_shows_registration_notice() {
    let app = app(&MockEduApi::new());
    let response = get(&app, "/login?alert=Registration+successful", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("Registration successful"));
}

// --- Registration ---

#[tokio::test]
async fn test_register_forwards_account_and_redirects_to_login() {
    let api = MockEduApi::new().reply_json(
        Method::POST,
        "/auth/register",
        json!({ "id": 12, "username": "amy", "role": "student" }),
    );
    let app = app(&api);

    let response = post_form(&app, "/register", None, "username=amy&password=pw&role=student").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/login?alert="));

    let call = &api.calls_to(Method::POST, "/auth/register")[0];
    assert_eq!(
        call.body,
        json!({ "username": "amy", "password": "pw", "role": "student" })
    );
}

#[tokio::test]
async fn test_register_shows_server_detail_on_rejection() {
    let api = MockEduApi::new().reply_error(
        Method::POST,
        "/auth/register",
        ApiError::Status {
            status: 400,
            detail: Some("Username already registered".to_string()),
        },
    );
    let app = app(&api);

    let response = post_form(&app, "/register", None, "username=amy&password=pw&role=student").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("Username already registered"));
}

#[tokio::test]
async fn test_register_falls_back_to_generic_failure_text() {
    let api = MockEduApi::new().reply_error(
        Method::POST,
        "/auth/register",
        ApiError::Transport("connection refused".to_string()),
    );
    let app = app(&api);

    let response = post_form(&app, "/register", None, "username=amy&password=pw&role=teacher").await;
    assert!(body_string(response).await.contains("Registration failed"));
}

// --- Logout & Session Teardown ---

#[tokio::test]
async fn test_logout_clears_all_three_keys() {
    let app = app(&MockEduApi::new());
    let cookie = session_cookie("t1", "admin", "root");

    let response = post_form(&app, "/logout", Some(&cookie), "").await;
    assert_redirect(&response, "/login");
    for key in ["token", "role", "username"] {
        assert!(clears_cookie(&response, key), "{} was not cleared", key);
    }

    // A browser that dropped the cookies is blocked again.
    let response = get(&app, "/admin/dashboard", None).await;
    assert_redirect(&response, "/login");
}

#[tokio::test]
async fn test_logout_without_session_is_harmless() {
    let app = app(&MockEduApi::new());
    let response = get(&app, "/logout", None).await;
    assert_redirect(&response, "/login");
    assert!(clears_cookie(&response, "token"));
}

#[tokio::test]
async fn test_rejected_token_signs_out() {
    let api = MockEduApi::new().reply_error(Method::GET, "/student/homeworks", ApiError::Unauthorized);
    let app = app(&api);
    let cookie = session_cookie("stale", "student", "amy");

    let response = get(&app, "/student/homeworks", Some(&cookie)).await;
    assert_redirect(&response, "/login");
    for key in ["token", "role", "username"] {
        assert!(clears_cookie(&response, key));
    }
}

#[tokio::test]
async fn test_rejected_token_on_write_signs_out() {
    let api = MockEduApi::new().reply_error(Method::POST, "/classes/student/join", ApiError::Unauthorized);
    let app = app(&api);
    let cookie = session_cookie("stale", "student", "amy");

    let response = post_form(&app, "/student/classes", Some(&cookie), "class_id=7").await;
    assert_redirect(&response, "/login");
    assert!(clears_cookie(&response, "token"));
}

#[tokio::test]
async fn test_health_is_public() {
    let app = app(&MockEduApi::new());
    let response = get(&app, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}
