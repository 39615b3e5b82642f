use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::session::{Role, Session};

/// Public entry point every blocked navigation is sent to.
pub const LOGIN_PATH: &str = "/login";

/// Allow-lists for the three protected subtrees.
pub const STUDENT_ROLES: &[Role] = &[Role::Student];
pub const TEACHER_ROLES: &[Role] = &[Role::Teacher];
pub const ADMIN_ROLES: &[Role] = &[Role::Admin];

/// Access
///
/// The decision taken for one navigation into a protected subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    RedirectTo(&'static str),
}

/// authorize
///
/// Pure guard decision. A session passes only when it carries a non-empty token
/// AND its role is on the allow-list. The token is trusted on presence alone;
/// the remote API re-checks it on every call.
pub fn authorize(session: &Session, allowed: &[Role]) -> Access {
    let has_token = session.token.as_deref().is_some_and(|t| !t.is_empty());
    let role_allowed = session.role.is_some_and(|role| allowed.contains(&role));

    if has_token && role_allowed {
        Access::Allow
    } else {
        Access::RedirectTo(LOGIN_PATH)
    }
}

/// require_roles
///
/// Middleware attached to each role subtree with its allow-list as state.
/// `authorize` runs before any handler or fallback of the subtree, so a blocked
/// request never reaches protected rendering. Redirects use `303 See Other`,
/// which the browser follows without keeping the blocked URL in history.
pub async fn require_roles(
    State(allowed): State<&'static [Role]>,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    match authorize(&session, allowed) {
        Access::Allow => next.run(request).await,
        Access::RedirectTo(target) => {
            let reason = if session.token.as_deref().is_none_or(str::is_empty) {
                "missing token"
            } else {
                "role not allowed"
            };
            tracing::info!(
                path = %request.uri().path(),
                role = ?session.role,
                reason,
                "Guard redirected navigation to login"
            );
            Redirect::to(target).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{StatusCode, header},
        middleware,
        routing::get,
    };
    use tower::util::ServiceExt;

    fn session(token: Option<&str>, role: Option<Role>) -> Session {
        Session {
            token: token.map(str::to_string),
            role,
            username: "u".to_string(),
        }
    }

    #[test]
    fn no_token_is_redirected_for_every_subtree() {
        for allowed in [STUDENT_ROLES, TEACHER_ROLES, ADMIN_ROLES] {
            for role in Role::ALL {
                assert_eq!(
                    authorize(&session(None, Some(role)), allowed),
                    Access::RedirectTo(LOGIN_PATH)
                );
            }
        }
    }

    #[test]
    fn empty_token_counts_as_missing() {
        assert_eq!(
            authorize(&session(Some(""), Some(Role::Teacher)), TEACHER_ROLES),
            Access::RedirectTo(LOGIN_PATH)
        );
    }

    #[test]
    fn role_outside_allow_list_is_redirected() {
        assert_eq!(
            authorize(&session(Some("t"), Some(Role::Student)), ADMIN_ROLES),
            Access::RedirectTo(LOGIN_PATH)
        );
        assert_eq!(
            authorize(&session(Some("t"), None), STUDENT_ROLES),
            Access::RedirectTo(LOGIN_PATH)
        );
    }

    #[test]
    fn matching_role_with_token_is_allowed() {
        let cases = [
            (Role::Student, STUDENT_ROLES),
            (Role::Teacher, TEACHER_ROLES),
            (Role::Admin, ADMIN_ROLES),
        ];
        for (role, allowed) in cases {
            assert_eq!(authorize(&session(Some("t1"), Some(role)), allowed), Access::Allow);
        }
    }

    #[test]
    fn multi_role_allow_list_accepts_any_member() {
        let staff = &[Role::Teacher, Role::Admin];
        assert_eq!(authorize(&session(Some("t"), Some(Role::Admin)), staff), Access::Allow);
        assert_eq!(
            authorize(&session(Some("t"), Some(Role::Student)), staff),
            Access::RedirectTo(LOGIN_PATH)
        );
    }

    async fn navigate(cookie: &str) -> Response {
        let app = Router::new()
            .route("/inside", get(|| async { "protected" }))
            .layer(middleware::from_fn_with_state(TEACHER_ROLES, require_roles));
        let request = axum::http::Request::builder()
            .uri("/inside")
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap();
        app.oneshot(request).await.unwrap()
    }

    #[tokio::test]
    async fn middleware_runs_the_handler_only_when_allowed() {
        let response = navigate("token=t1; role=teacher; username=li").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::LOCATION).is_none());

        for cookie in ["token=t1; role=student", "token=; role=teacher", "role=teacher"] {
            let response = navigate(cookie).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", cookie);
            assert_eq!(response.headers()[header::LOCATION], LOGIN_PATH);
        }
    }
}
