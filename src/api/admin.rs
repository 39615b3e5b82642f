use bytes::Bytes;
use serde_json::{Value, json};

use super::{ApiCall, ApiError, EduApi, ProgressFn, Upload, resource_path, with_query};
use crate::models::{CoursewarePreview, CoursewareSummary, PublicDocument, UserAccount};

/// Usage statistics for the overview page, passed through untouched.
pub async fn dashboard(api: &dyn EduApi, token: &str) -> Result<Value, ApiError> {
    api.send(ApiCall::get("/admin/stats").bearer(token)).await?.json()
}

// --- Users ---

/// list_users
///
/// An empty `role` lists every account.
pub async fn list_users(api: &dyn EduApi, token: &str, role: &str) -> Result<Vec<UserAccount>, ApiError> {
    let path = if role.is_empty() {
        with_query("/admin/users", &[])
    } else {
        with_query("/admin/users", &[("role", role)])
    };
    api.send(ApiCall::get(path).bearer(token)).await?.json()
}

/// Disables the account. The server keeps its data.
pub async fn delete_user(api: &dyn EduApi, token: &str, uid: &str) -> Result<(), ApiError> {
    api.send(ApiCall::delete(resource_path("/admin/users/{}", &[uid])?).bearer(token))
        .await?;
    Ok(())
}

// --- Coursewares ---
// Per-courseware calls all live under the `/admin/coursewares/{cid}` collection.

pub async fn list_coursewares(api: &dyn EduApi, token: &str) -> Result<Vec<CoursewareSummary>, ApiError> {
    api.send(ApiCall::get("/admin/coursewares").bearer(token)).await?.json()
}

pub async fn share_courseware(api: &dyn EduApi, token: &str, cid: &str) -> Result<(), ApiError> {
    api.send(ApiCall::patch(resource_path("/admin/coursewares/{}/share", &[cid])?).bearer(token))
        .await?;
    Ok(())
}

pub async fn courseware_preview(api: &dyn EduApi, token: &str, cid: &str) -> Result<CoursewarePreview, ApiError> {
    api.send(ApiCall::get(resource_path("/admin/coursewares/{}/preview", &[cid])?).bearer(token))
        .await?
        .json()
}

pub async fn update_courseware(api: &dyn EduApi, token: &str, cid: &str, markdown: &str) -> Result<(), ApiError> {
    api.send(
        ApiCall::post(resource_path("/admin/coursewares/{}/update", &[cid])?)
            .bearer(token)
            .json(json!({ "markdown": markdown })),
    )
    .await?;
    Ok(())
}

pub async fn courseware_pdf(api: &dyn EduApi, token: &str, cid: &str) -> Result<Bytes, ApiError> {
    Ok(api
        .send(ApiCall::get(resource_path("/admin/coursewares/{}/download", &[cid])?).bearer(token))
        .await?
        .bytes)
}

// --- Public Document Library ---

pub async fn list_public_docs(api: &dyn EduApi, token: &str) -> Result<Vec<PublicDocument>, ApiError> {
    api.send(ApiCall::get("/admin/public_docs").bearer(token)).await?.json()
}

/// upload_public_doc
///
/// Streams the file to the library. `progress` receives the percentage sent
/// as the transfer advances; there is no way to cancel it.
pub async fn upload_public_doc(
    api: &dyn EduApi,
    token: &str,
    filename: &str,
    content_type: Option<String>,
    data: Bytes,
    progress: ProgressFn,
) -> Result<(), ApiError> {
    let upload = Upload {
        field: "file".to_string(),
        filename: filename.to_string(),
        content_type,
        data,
        progress,
    };
    api.send(ApiCall::post("/admin/public_docs").bearer(token).upload(upload))
        .await?;
    Ok(())
}

pub async fn delete_public_doc(api: &dyn EduApi, token: &str, id: &str) -> Result<(), ApiError> {
    api.send(ApiCall::delete(resource_path("/admin/public_docs/{}", &[id])?).bearer(token))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockEduApi;
    use reqwest::Method;

    #[tokio::test]
    async fn courseware_calls_share_one_collection_path() {
        let api = MockEduApi::new()
            .reply_json(Method::PATCH, "/admin/coursewares/6/share", json!({ "ok": true }))
            .reply_json(
                Method::GET,
                "/admin/coursewares/6/preview",
                json!({ "id": 6, "markdown": "# Intro" }),
            )
            .reply_json(Method::POST, "/admin/coursewares/6/update", json!({ "ok": true }))
            .reply_bytes(Method::GET, "/admin/coursewares/6/download", "application/pdf", b"%PDF");

        share_courseware(&api, "tok", "6").await.unwrap();
        courseware_preview(&api, "tok", "6").await.unwrap();
        update_courseware(&api, "tok", "6", "# Intro").await.unwrap();
        assert_eq!(courseware_pdf(&api, "tok", "6").await.unwrap(), Bytes::from_static(b"%PDF"));

        assert!(api.calls().iter().all(|c| c.path.starts_with("/admin/coursewares/6/")));
    }

    #[tokio::test]
    async fn user_id_is_encoded() {
        let api = MockEduApi::new();
        delete_user(&api, "tok", "4?hard=1").await.unwrap_err();
        assert_eq!(api.calls()[0].path, "/admin/users/4%3Fhard%3D1");
    }
}
