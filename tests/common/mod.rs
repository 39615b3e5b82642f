#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use edu_portal::{AppConfig, AppState, MockEduApi, create_router};
use std::sync::Arc;
use tower::util::ServiceExt;

// --- Router Setup ---

/// Builds the full portal router on top of a scripted API.
pub fn app(api: &MockEduApi) -> Router {
    create_router(AppState {
        api: Arc::new(api.clone()),
        config: AppConfig::default(),
    })
}

/// Cookie header for a signed-in browser.
pub fn session_cookie(token: &str, role: &str, username: &str) -> String {
    format!("token={}; role={}; username={}", token, role, username)
}

// --- Request Helpers ---

pub async fn get(app: &Router, path: &str, cookie: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_form(app: &Router, path: &str, cookie: Option<&str>, form: &str) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(builder.body(Body::from(form.to_string())).unwrap())
        .await
        .unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// --- Assertion Helpers ---

pub fn location(response: &Response<Body>) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

pub fn assert_redirect(response: &Response<Body>, expected: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER, "expected a redirect");
    assert_eq!(location(response), expected);
}

/// All `Set-Cookie` headers of a response.
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

/// True when the response expires `name`.
pub fn clears_cookie(response: &Response<Body>, name: &str) -> bool {
    set_cookies(response)
        .iter()
        .any(|c| c.starts_with(&format!("{}=", name)) && c.contains("Max-Age=0"))
}
