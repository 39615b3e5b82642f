//! Page Handlers
//!
//! One module per audience. The helpers below are the only places that turn an
//! `ApiError` into a response, so every page reacts to failures the same way:
//!
//! * `Unauthorized` clears the session and sends the browser to the login page.
//! * Failed reads render the page with an inline error in place of the content.
//! * Failed writes redirect back to the originating page with an `alert`.

use axum::{
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use bytes::Bytes;
use maud::Markup;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{
    api::{ApiError, with_query},
    guard::LOGIN_PATH,
    render,
    session::{Role, Session},
};

pub mod admin;
pub mod public;
pub mod student;
pub mod teacher;

/// Notice
///
/// The one-shot `?alert=` message a redirect can carry to the next page.
#[derive(Debug, Default, Deserialize)]
pub struct Notice {
    pub alert: Option<String>,
}

impl Notice {
    pub fn message(&self) -> Option<&str> {
        self.alert.as_deref().filter(|m| !m.is_empty())
    }
}

/// Renders a protected page inside the role layout.
pub fn page(session: &Session, role: Role, title: &str, notice: &Notice, content: Markup) -> Response {
    Html(render::layout(session, role, title, notice.message(), content).into_string()).into_response()
}

/// signed_out
///
/// Response for a token the remote API no longer accepts: every session key is
/// expired and the browser lands on the login page.
pub fn signed_out() -> Response {
    (Session::clear(CookieJar::new()), Redirect::to(LOGIN_PATH)).into_response()
}

/// section
///
/// Renders the successful half of a read. A rejected session short-circuits the
/// whole page via `Err`; any other failure becomes an inline error block.
pub fn section<T>(result: Result<T, ApiError>, render_ok: impl FnOnce(T) -> Markup) -> Result<Markup, Response> {
    match result {
        Ok(value) => Ok(render_ok(value)),
        Err(ApiError::Unauthorized) => Err(signed_out()),
        Err(err) => {
            tracing::warn!(error = %err, "Page data could not be loaded");
            Ok(render::error_block(&err.user_message()))
        }
    }
}

/// An empty `message` redirects without an alert.
pub fn redirect_with_alert(path: &str, message: &str) -> Response {
    if message.is_empty() {
        return Redirect::to(path).into_response();
    }
    Redirect::to(&with_query(path, &[("alert", message)])).into_response()
}

/// write_failed
///
/// Reaction to a rejected mutation: back to `back` with the reason as an alert.
pub fn write_failed(err: ApiError, back: &str) -> Response {
    match err {
        ApiError::Unauthorized => signed_out(),
        err => {
            tracing::warn!(error = %err, back, "Remote write failed");
            redirect_with_alert(back, &err.user_message())
        }
    }
}

/// Redirects to `next` with `success` on completion, or back with the failure.
pub fn after_write<T>(result: Result<T, ApiError>, next: &str, success: &str, back: &str) -> Response {
    match result {
        Ok(_) => redirect_with_alert(next, success),
        Err(err) => write_failed(err, back),
    }
}

/// pdf_download
///
/// Passes an opaque PDF payload through to the browser as an attachment.
pub fn pdf_download(result: Result<Bytes, ApiError>, filename: &str, back: &str) -> Response {
    match result {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", header_safe(filename)),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(err) => write_failed(err, back),
    }
}

/// Keeps a filename usable inside a quoted header parameter.
fn header_safe(filename: &str) -> String {
    filename
        .chars()
        .filter(|c| c.is_ascii_graphic() && *c != '"' && *c != '\\')
        .collect()
}

/// answers_from_form
///
/// Collects an answer sheet into the map the grading endpoints expect. Fields
/// named `choice:<id>` carry an option index and are sent as numbers; fields
/// named `text:<id>` are sent as strings. Anything else is ignored.
pub fn answers_from_form(fields: Vec<(String, String)>) -> Map<String, Value> {
    let mut answers = Map::new();
    for (name, value) in fields {
        if let Some(id) = name.strip_prefix("choice:") {
            let answer = value
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or(Value::String(value));
            answers.insert(id.to_string(), answer);
        } else if let Some(id) = name.strip_prefix("text:") {
            answers.insert(id.to_string(), Value::String(value));
        }
    }
    answers
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use maud::html;
    use serde_json::json;

    #[test]
    fn answers_map_choices_to_indices_and_keeps_text() {
        let answers = answers_from_form(vec![
            ("choice:1".to_string(), "2".to_string()),
            ("text:q2".to_string(), "because".to_string()),
            ("csrf".to_string(), "ignored".to_string()),
        ]);
        assert_eq!(Value::Object(answers), json!({ "1": 2, "q2": "because" }));
    }

    #[test]
    fn unparsable_choice_is_kept_verbatim() {
        let answers = answers_from_form(vec![("choice:7".to_string(), "B".to_string())]);
        assert_eq!(answers.get("7"), Some(&json!("B")));
    }

    #[test]
    fn unauthorized_read_signs_out() {
        let Err(response) = section::<()>(Err(ApiError::Unauthorized), |_| html! {}) else {
            panic!("a rejected session must not render");
        };
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], LOGIN_PATH);
        let cleared = response.headers().get_all(header::SET_COOKIE).iter().count();
        assert_eq!(cleared, 3);
    }

    #[test]
    fn failed_read_renders_inline_error() {
        let Ok(html) = section::<()>(
            Err(ApiError::Status {
                status: 500,
                detail: Some("boom".to_string()),
            }),
            |_| html! {},
        ) else {
            panic!("a failed read should still render");
        };
        assert!(html.into_string().contains("boom"));
    }

    #[test]
    fn failed_write_redirects_back_with_alert() {
        let response = write_failed(ApiError::Transport("refused".to_string()), "/student/classes");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        assert!(location.starts_with("/student/classes?alert="));
    }

    #[test]
    fn pdf_filename_is_made_header_safe() {
        assert_eq!(header_safe("courseware_\"7\" é.pdf"), "courseware_7.pdf");
    }

    #[test]
    fn pdf_is_served_as_attachment() {
        let response = pdf_download(Ok(Bytes::from_static(b"%PDF-1.4")), "lesson.pdf", "/teacher/lesson");
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"lesson.pdf\""
        );
    }
}
