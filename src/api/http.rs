use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{
    Body, Client, StatusCode,
    header::CONTENT_TYPE,
    multipart::{Form, Part},
};

use super::{ApiBody, ApiCall, ApiError, ApiReply, EduApi, UPLOAD_CHUNK_SIZE, chunk_with_progress};

/// HttpEduApi
///
/// The concrete implementation backed by `reqwest`. Every call is resolved
/// against the configured base URL and carries `Authorization: Bearer <token>`
/// whenever the session has one.
#[derive(Clone)]
pub struct HttpEduApi {
    client: Client,
    base_url: String,
}

impl HttpEduApi {
    /// new
    ///
    /// Builds the shared HTTP client. `timeout` bounds each request end to end.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

#[async_trait]
impl EduApi for HttpEduApi {
    async fn send(&self, call: ApiCall) -> Result<ApiReply, ApiError> {
        let url = self.url_for(&call.path);
        let mut request = self.client.request(call.method.clone(), &url);

        if let Some(token) = &call.token {
            request = request.bearer_auth(token);
        }

        request = match call.body {
            ApiBody::Empty => request,
            ApiBody::Json(value) => request.json(&value),
            ApiBody::Form(pairs) => request.form(&pairs),
            ApiBody::Upload(upload) => {
                // The body is pulled chunk by chunk as it goes out, so the
                // callback fires while the transfer is in flight.
                let total = upload.data.len() as u64;
                let progress = upload.progress.clone();
                let chunks = chunk_with_progress(&upload.data, UPLOAD_CHUNK_SIZE);
                let stream = futures::stream::iter(chunks.into_iter().map(move |(chunk, percent)| {
                    progress(percent);
                    Ok::<Bytes, std::io::Error>(chunk)
                }));

                let mut part =
                    Part::stream_with_length(Body::wrap_stream(stream), total).file_name(upload.filename);
                if let Some(content_type) = &upload.content_type {
                    part = part
                        .mime_str(content_type)
                        .map_err(|e| ApiError::Transport(e.to_string()))?;
                }
                request.multipart(Form::new().part(upload.field, part))
            }
        };

        let response = request.send().await.map_err(|e| {
            tracing::warn!(method = %call.method, path = %call.path, error = %e, "Education API request failed");
            ApiError::Transport(e.to_string())
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            tracing::info!(path = %call.path, "Education API rejected the session token");
            return Err(ApiError::Unauthorized);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !status.is_success() {
            let err = ApiError::from_status(status.as_u16(), &bytes);
            tracing::warn!(method = %call.method, path = %call.path, error = %err, "Education API returned an error");
            return Err(err);
        }

        tracing::debug!(method = %call.method, path = %call.path, status = status.as_u16(), "Education API call completed");
        Ok(ApiReply {
            content_type,
            bytes,
        })
    }
}
