use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Method;
use serde_json::{Value, json};

use super::{ApiBody, ApiCall, ApiError, ApiReply, EduApi, UPLOAD_CHUNK_SIZE, chunk_with_progress};

/// RecordedCall
///
/// What the mock saw for one request, with the body flattened to JSON so
/// assertions stay simple. Forms become objects, uploads become
/// `{"field", "filename", "size"}`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub token: Option<String>,
    pub body: Value,
}

#[derive(Default)]
struct MockState {
    replies: HashMap<(Method, String), Result<ApiReply, ApiError>>,
    calls: Vec<RecordedCall>,
}

/// MockEduApi
///
/// In-memory stand-in for the remote service, used by the integration tests.
/// Replies are scripted per `(method, path)`; anything unscripted fails with a
/// 404 status error. Clones share the same script and call log.
#[derive(Clone, Default)]
pub struct MockEduApi {
    state: Arc<Mutex<MockState>>,
}

impl MockEduApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn reply_json(self, method: Method, path: &str, body: Value) -> Self {
        self.script(method, path, Ok(ApiReply::from_json(&body)))
    }

    pub fn reply_bytes(self, method: Method, path: &str, content_type: &str, body: &'static [u8]) -> Self {
        self.script(
            method,
            path,
            Ok(ApiReply {
                content_type: Some(content_type.to_string()),
                bytes: Bytes::from_static(body),
            }),
        )
    }

    pub fn reply_error(self, method: Method, path: &str, error: ApiError) -> Self {
        self.script(method, path, Err(error))
    }

    fn script(self, method: Method, path: &str, reply: Result<ApiReply, ApiError>) -> Self {
        self.state().replies.insert((method, path.to_string()), reply);
        self
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state().calls.clone()
    }

    /// Calls matching a method and path.
    pub fn calls_to(&self, method: Method, path: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method && c.path == path)
            .collect()
    }
}

#[async_trait]
impl EduApi for MockEduApi {
    async fn send(&self, call: ApiCall) -> Result<ApiReply, ApiError> {
        let body = match &call.body {
            ApiBody::Empty => Value::Null,
            ApiBody::Json(value) => value.clone(),
            ApiBody::Form(pairs) => Value::Object(
                pairs
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            ),
            ApiBody::Upload(upload) => {
                // Drive the callback exactly as the HTTP client would.
                for (_, percent) in chunk_with_progress(&upload.data, UPLOAD_CHUNK_SIZE) {
                    (upload.progress)(percent);
                }
                json!({
                    "field": upload.field,
                    "filename": upload.filename,
                    "size": upload.data.len(),
                })
            }
        };

        let mut state = self.state();
        state.calls.push(RecordedCall {
            method: call.method.clone(),
            path: call.path.clone(),
            token: call.token.clone(),
            body,
        });

        match state.replies.get(&(call.method.clone(), call.path.clone())) {
            Some(reply) => reply.clone(),
            None => Err(ApiError::Status {
                status: 404,
                detail: None,
            }),
        }
    }
}
