mod common;

use axum::http::StatusCode;
use common::{app, assert_redirect, body_string, get, post_form, session_cookie};
use edu_portal::MockEduApi;
use reqwest::Method;
use serde_json::json;

const PROTECTED_PATHS: &[&str] = &[
    "/teacher",
    "/teacher/lesson",
    "/teacher/lesson/list",
    "/teacher/students/3",
    "/teacher/does-not-exist",
    "/student",
    "/student/homeworks",
    "/student/ai/4",
    "/student/nowhere",
    "/admin",
    "/admin/dashboard",
    "/admin/users",
    "/admin/whatever/else",
];

#[tokio::test]
async fn test_no_token_redirects_every_protected_path_to_login() {
    let api = MockEduApi::new();
    let app = app(&api);

    for path in PROTECTED_PATHS {
        let response = get(&app, path, None).await;
        assert_redirect(&response, "/login");
    }
    assert!(api.calls().is_empty(), "a blocked navigation must not reach the API");
}

#[tokio::test]
async fn test_role_without_token_is_still_blocked() {
    let app = app(&MockEduApi::new());
    let response = get(&app, "/teacher/lesson", Some("role=teacher; username=li")).await;
    assert_redirect(&response, "/login");
}

#[tokio::test]
async fn test_student_cannot_enter_admin_subtree() {
    let api = MockEduApi::new();
    let app = app(&api);
    let cookie = session_cookie("t1", "student", "amy");

    let response = get(&app, "/admin/dashboard", Some(&cookie)).await;
    assert_redirect(&response, "/login");

    // The fallback of a foreign subtree is guarded too.
    let response = get(&app, "/admin/unknown", Some(&cookie)).await;
    assert_redirect(&response, "/login");
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_protected_writes_are_guarded() {
    let api = MockEduApi::new();
    let app = app(&api);
    let cookie = session_cookie("t1", "student", "amy");

    let response = post_form(&app, "/admin/users/9/delete", Some(&cookie), "").await;
    assert_redirect(&response, "/login");
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_teacher_reaches_own_pages_but_not_student_pages() {
    let api = MockEduApi::new().reply_json(
        Method::GET,
        "/teacher/lesson/list",
        json!([{ "id": 1, "topic": "Fractions", "created_at": "2024-03-01T09:30:00" }]),
    );
    let app = app(&api);
    let cookie = session_cookie("t1", "teacher", "li");

    let response = get(&app, "/teacher/lesson/list", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("Fractions"));
    assert!(html.contains("2024-03-01 09:30"));

    let response = get(&app, "/student/homeworks", Some(&cookie)).await;
    assert_redirect(&response, "/login");

    let calls = api.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].token.as_deref(), Some("t1"));
}

#[tokio::test]
async fn test_unknown_sub_path_falls_back_to_role_default_page() {
    let app = app(&MockEduApi::new());

    let cases = [
        ("teacher", "/teacher/bogus", "/teacher/lesson"),
        ("student", "/student/bogus/deeper", "/student/homeworks"),
        ("admin", "/admin/bogus", "/admin/dashboard"),
    ];
    for (role, path, expected) in cases {
        let cookie = session_cookie("t1", role, "u");
        let response = get(&app, path, Some(&cookie)).await;
        assert_redirect(&response, expected);
    }
}

#[tokio::test]
async fn test_get_on_post_only_path_falls_back_to_role_default_page() {
    let api = MockEduApi::new();
    let app = app(&api);

    let cases = [
        ("teacher", "/teacher/exercise/save", "/teacher/lesson"),
        ("teacher", "/teacher/lesson/pdf", "/teacher/lesson"),
        ("teacher", "/teacher/classes/3/delete", "/teacher/lesson"),
        ("student", "/student/homeworks/7/submit", "/student/homeworks"),
        ("student", "/student/classes/2/leave", "/student/homeworks"),
        ("admin", "/admin/users/4/delete", "/admin/dashboard"),
    ];
    for (role, path, expected) in cases {
        let cookie = session_cookie("t1", role, "u");
        let response = get(&app, path, Some(&cookie)).await;
        assert_redirect(&response, expected);

        // Without a session the guard still answers first.
        let response = get(&app, path, None).await;
        assert_redirect(&response, "/login");
    }

    // A POST to a read-only page is treated the same way.
    let cookie = session_cookie("t1", "teacher", "u");
    let response = post_form(&app, "/teacher/lesson/list", Some(&cookie), "").await;
    assert_redirect(&response, "/teacher/lesson");
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_unknown_top_level_path_goes_to_login() {
    let app = app(&MockEduApi::new());
    let cookie = session_cookie("t1", "teacher", "li");

    assert_redirect(&get(&app, "/nothing/here", Some(&cookie)).await, "/login");
    assert_redirect(&get(&app, "/", Some(&cookie)).await, "/login");
}

#[tokio::test]
async fn test_unrecognized_role_value_is_blocked() {
    let app = app(&MockEduApi::new());
    let response = get(&app, "/teacher/lesson", Some("token=t1; role=superuser")).await;
    assert_redirect(&response, "/login");
}

#[tokio::test]
async fn test_role_root_renders_workspace_for_allowed_role() {
    let app = app(&MockEduApi::new());
    let cookie = session_cookie("t1", "student", "amy");

    let response = get(&app, "/student", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("Hello, Student amy"));
    assert!(html.contains("/student/self_practice"));
}
