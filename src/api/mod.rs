//! Remote Education API Module
//!
//! Everything the portal knows about the external HTTP service lives here:
//! the `EduApi` seam, its `reqwest` and in-memory implementations, and typed
//! endpoint wrappers grouped by audience.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub mod admin;
pub mod auth;
pub mod http;
pub mod mock;
pub mod student;
pub mod teacher;

pub use http::HttpEduApi;
pub use mock::{MockEduApi, RecordedCall};

/// Size of each slice an upload is streamed in.
pub const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Callback receiving upload progress as a percentage in `0..=100`.
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

// 1. Failure Taxonomy
/// ApiError
///
/// Every way a remote call can fail. `Unauthorized` is kept apart because it
/// always tears the session down instead of being shown to the user.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("session rejected by the education API")]
    Unauthorized,

    #[error("education API returned {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Status { status: u16, detail: Option<String> },

    #[error("education API unreachable: {0}")]
    Transport(String),

    #[error("unexpected response from education API: {0}")]
    Decode(String),
}

impl ApiError {
    /// from_status
    ///
    /// Builds a status error from a non-2xx body, lifting the `detail` field
    /// the API puts in its JSON error bodies.
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let detail = match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => match map.get("detail") {
                Some(Value::String(text)) => Some(text.clone()),
                Some(other) => Some(other.to_string()),
                None => None,
            },
            _ => {
                let text = String::from_utf8_lossy(body).trim().to_string();
                (!text.is_empty() && text.len() <= 200).then_some(text)
            }
        };
        ApiError::Status { status, detail }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }

    /// Text safe to show inside a page.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized => "Your session has expired, please sign in again.".to_string(),
            ApiError::Status {
                detail: Some(detail),
                ..
            } => detail.clone(),
            ApiError::Status { status: 404, .. } => "Not found.".to_string(),
            ApiError::Status { status, .. } => format!("Request rejected (HTTP {}).", status),
            ApiError::Transport(_) => {
                "The education service is unavailable, please try again later.".to_string()
            }
            ApiError::Decode(_) => "The education service sent an unexpected response.".to_string(),
        }
    }
}

// 2. Request & Reply Shapes
/// Upload
///
/// A single file sent as multipart form data.
#[derive(Clone)]
pub struct Upload {
    pub field: String,
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Bytes,
    pub progress: ProgressFn,
}

#[derive(Clone)]
pub enum ApiBody {
    Empty,
    Json(Value),
    Form(Vec<(String, String)>),
    Upload(Upload),
}

/// ApiCall
///
/// One request to the remote API. `path` is relative to the configured base URL
/// and may carry a query string.
#[derive(Clone)]
pub struct ApiCall {
    pub method: Method,
    pub path: String,
    pub token: Option<String>,
    pub body: ApiBody,
}

impl ApiCall {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            token: None,
            body: ApiBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// Attaches the bearer token. An empty token sends no header.
    pub fn bearer(mut self, token: &str) -> Self {
        self.token = (!token.is_empty()).then(|| token.to_string());
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = ApiBody::Json(body);
        self
    }

    pub fn form(mut self, pairs: Vec<(String, String)>) -> Self {
        self.body = ApiBody::Form(pairs);
        self
    }

    pub fn upload(mut self, upload: Upload) -> Self {
        self.body = ApiBody::Upload(upload);
        self
    }
}

/// ApiReply
///
/// A successful (2xx) response body, decoded lazily by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiReply {
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl ApiReply {
    pub fn from_json(value: &Value) -> Self {
        Self {
            content_type: Some("application/json".to_string()),
            bytes: Bytes::from(value.to_string()),
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

// 3. The Seam
/// EduApi
///
/// Abstract contract for talking to the remote service. Handlers only ever
/// see `ApiState`, so tests swap in `MockEduApi` without a network.
#[async_trait]
pub trait EduApi: Send + Sync {
    async fn send(&self, call: ApiCall) -> Result<ApiReply, ApiError>;
}

/// ApiState
///
/// The concrete type used to share the API client across the application state.
pub type ApiState = Arc<dyn EduApi>;

/// chunk_with_progress
///
/// Splits an upload into `chunk_size` slices, pairing each with the percentage
/// sent once that slice has gone out. Percentages never decrease and the last
/// one is always 100, including for empty payloads.
pub fn chunk_with_progress(data: &Bytes, chunk_size: usize) -> Vec<(Bytes, u8)> {
    let total = data.len();
    if total == 0 {
        return vec![(Bytes::new(), 100)];
    }
    let chunk_size = chunk_size.max(1);

    let mut chunks = Vec::with_capacity(total.div_ceil(chunk_size));
    let mut sent = 0;
    while sent < total {
        let end = (sent + chunk_size).min(total);
        let percent = (end * 100 / total) as u8;
        chunks.push((data.slice(sent..end), percent));
        sent = end;
    }
    chunks
}

/// Percent-encodes a query string from key/value pairs.
pub(crate) fn with_query(path: &str, pairs: &[(&str, &str)]) -> String {
    if pairs.is_empty() {
        return path.to_string();
    }
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();
    format!("{}?{}", path, query)
}

/// Percent-encodes one path segment. Only unreserved characters survive, so an
/// id can never add segments or a query string.
pub fn path_segment(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// resource_path
///
/// Fills each `{}` in `template` with the next id, encoded as a single segment.
/// Empty and dot-only ids are refused as not found: URL normalisation would
/// resolve them against the parent path even when encoded.
pub(crate) fn resource_path(template: &str, ids: &[&str]) -> Result<String, ApiError> {
    let mut pieces = template.split("{}");
    let mut path = pieces.next().unwrap_or_default().to_string();
    let mut ids = ids.iter();
    for piece in pieces {
        let id = ids.next().copied().unwrap_or_default();
        if id.is_empty() || id.chars().all(|c| c == '.') {
            tracing::info!(template, id, "Refused path parameter that is not a resource id");
            return Err(ApiError::Status {
                status: 404,
                detail: None,
            });
        }
        path.push_str(&path_segment(id));
        path.push_str(piece);
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_monotonic_and_ends_at_100() {
        let data = Bytes::from(vec![7u8; 250]);
        let chunks = chunk_with_progress(&data, 100);
        let percents: Vec<u8> = chunks.iter().map(|(_, p)| *p).collect();
        assert_eq!(percents, vec![40, 80, 100]);
        let total: usize = chunks.iter().map(|(c, _)| c.len()).sum();
        assert_eq!(total, 250);
    }

    #[test]
    fn empty_upload_reports_completion() {
        let chunks = chunk_with_progress(&Bytes::new(), UPLOAD_CHUNK_SIZE);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].1, 100);
    }

    #[test]
    fn status_error_lifts_detail_field() {
        let err = ApiError::from_status(400, br#"{"detail":"Username exists"}"#);
        assert_eq!(
            err,
            ApiError::Status {
                status: 400,
                detail: Some("Username exists".to_string())
            }
        );
        assert_eq!(err.user_message(), "Username exists");
    }

    #[test]
    fn status_error_without_detail_uses_generic_text() {
        let err = ApiError::from_status(404, b"");
        assert!(err.is_not_found());
        assert_eq!(err.user_message(), "Not found.");
        assert_eq!(
            ApiError::from_status(500, br#"{"error":"x"}"#).user_message(),
            "Request rejected (HTTP 500)."
        );
    }

    #[test]
    fn empty_bearer_sends_no_token() {
        assert_eq!(ApiCall::get("/auth/me").bearer("").token, None);
        assert_eq!(
            ApiCall::get("/auth/me").bearer("t1").token.as_deref(),
            Some("t1")
        );
    }

    #[test]
    fn query_pairs_are_encoded() {
        assert_eq!(with_query("/admin/users", &[]), "/admin/users");
        assert_eq!(
            with_query("/admin/users", &[("role", "a b")]),
            "/admin/users?role=a+b"
        );
    }

    #[test]
    fn path_segments_cannot_escape_their_slot() {
        assert_eq!(path_segment("42"), "42");
        assert_eq!(path_segment("a b"), "a%20b");
        assert_eq!(
            path_segment("../../classes/teacher?x=1"),
            "..%2F..%2Fclasses%2Fteacher%3Fx%3D1"
        );
        assert_eq!(
            resource_path("/classes/teacher/{}/student/{}", &["3", "9#frag"]).unwrap(),
            "/classes/teacher/3/student/9%23frag"
        );
    }

    #[test]
    fn dot_and_empty_ids_are_not_found() {
        for id in ["", ".", ".."] {
            let err = resource_path("/teacher/lesson/preview/{}", &[id]).unwrap_err();
            assert!(err.is_not_found(), "{:?} should be refused", id);
        }
    }
}
