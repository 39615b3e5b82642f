use axum::{
    Form,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use super::{Notice, redirect_with_alert};
use crate::{
    AppConfig,
    api::{ApiError, ApiState, auth},
    guard::LOGIN_PATH,
    models::{LoginForm, RegisterRequest},
    render,
    session::{Role, Session},
};

const LOGIN_FAILED: &str = "Invalid username or password";
const REGISTER_FAILED: &str = "Registration failed";

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub role: String,
}

/// The bare root has no content of its own.
pub async fn root() -> Redirect {
    Redirect::to(LOGIN_PATH)
}

pub async fn login_page(Query(notice): Query<Notice>) -> Html<String> {
    Html(render::login_page(notice.message(), None, "").into_string())
}

/// login
///
/// [Public Route] Exchanges credentials for a token, persists the session
/// triple and lands on the role's home. Any failure re-renders the form with
/// the same generic message.
pub async fn login(
    State(api): State<ApiState>,
    State(config): State<AppConfig>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    match auth::login(api.as_ref(), form.username.trim(), &form.password).await {
        Ok(signed_in) => {
            tracing::info!(username = %form.username, role = %signed_in.role, "User signed in");
            let session = Session::signed_in(signed_in.token, signed_in.role, form.username.trim());
            (
                session.persist(jar, config.secure_cookies()),
                Redirect::to(signed_in.role.home_path()),
            )
                .into_response()
        }
        Err(err) => {
            tracing::warn!(username = %form.username, error = %err, "Sign-in rejected");
            Html(render::login_page(None, Some(LOGIN_FAILED), &form.username).into_string()).into_response()
        }
    }
}

pub async fn register_page() -> Html<String> {
    Html(render::register_page(None, "").into_string())
}

/// register
///
/// [Public Route] Creates an account, then sends the user to sign in. The
/// API's `detail` text is shown when the account is refused.
pub async fn register(State(api): State<ApiState>, Form(form): Form<RegisterForm>) -> Response {
    let role = match form.role.parse::<Role>() {
        Ok(role) => role,
        Err(_) => {
            return Html(render::register_page(Some(REGISTER_FAILED), &form.username).into_string()).into_response();
        }
    };
    let request = RegisterRequest {
        username: form.username.trim().to_string(),
        password: form.password,
        role,
    };

    match auth::register(api.as_ref(), &request).await {
        Ok(profile) => {
            tracing::info!(username = %profile.username, role = %role, "Account registered");
            redirect_with_alert(LOGIN_PATH, "Registration successful, please sign in.")
        }
        Err(err) => {
            tracing::warn!(username = %request.username, error = %err, "Registration rejected");
            let message = match &err {
                ApiError::Status {
                    detail: Some(detail),
                    ..
                } => detail.as_str(),
                _ => REGISTER_FAILED,
            };
            Html(render::register_page(Some(message), &request.username).into_string()).into_response()
        }
    }
}

/// logout
///
/// Expires the whole session in one response. Works without a session too.
pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    (Session::clear(jar), Redirect::to(LOGIN_PATH))
}

pub async fn health() -> &'static str {
    "ok"
}
