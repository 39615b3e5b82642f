use std::sync::{
    Arc,
    atomic::{AtomicU8, Ordering},
};

use axum::{
    Form,
    extract::{Multipart, Path, Query, State},
    response::Response,
};
use bytes::Bytes;
use maud::{Markup, html};
use serde::Deserialize;

use super::{Notice, after_write, page, pdf_download, redirect_with_alert, section, write_failed};
use crate::{
    api::{ApiState, ProgressFn, admin, path_segment},
    render::{self, format_optional_datetime, link},
    session::{Role, Session},
};

type PageResult = Result<Response, Response>;

#[derive(Debug, Default, Deserialize)]
pub struct UserFilter {
    #[serde(default)]
    pub role: String,
    pub alert: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MarkdownForm {
    #[serde(default)]
    pub markdown: String,
}

fn show(session: &Session, title: &str, notice: &Notice, content: Markup) -> Response {
    page(session, Role::Admin, title, notice, content)
}

/// dashboard
///
/// [Admin Route] Platform usage overview, rendered as the API reports it.
pub async fn dashboard(session: Session, State(api): State<ApiState>, Query(notice): Query<Notice>) -> PageResult {
    let result = admin::dashboard(api.as_ref(), session.bearer()).await;
    let content = section(result, |stats| {
        html! {
            (render::role_home(Role::Admin))
            (render::json_block(&stats))
        }
    })?;
    Ok(show(&session, "Overview", &notice, content))
}

// --- Users ---

pub async fn users(session: Session, State(api): State<ApiState>, Query(filter): Query<UserFilter>) -> PageResult {
    let result = admin::list_users(api.as_ref(), session.bearer(), filter.role.trim()).await;
    let list = section(result, |users| {
        if users.is_empty() {
            return render::empty_block("No users match.");
        }
        let rows = users
            .iter()
            .map(|u| {
                vec![
                    html! { (u.id) },
                    html! { (u.username) },
                    html! { (u.role.as_deref().unwrap_or("")) },
                    html! { (u.status.as_deref().unwrap_or("")) },
                    render::action_button(&format!("/admin/users/{}/delete", u.id), "Disable"),
                ]
            })
            .collect();
        render::table(&["ID", "Username", "Role", "Status", ""], rows)
    })?;

    let options = std::iter::once(("", "All roles")).chain(Role::ALL.iter().map(|r| (r.as_str(), r.label())));
    let content = html! {
        form method="get" action="/admin/users" {
            select name="role" {
                @for (value, label) in options {
                    option value=(value) selected[value == filter.role] { (label) }
                }
            }
            button type="submit" { "Filter" }
        }
        (list)
    };

    let notice = Notice { alert: filter.alert };
    Ok(show(&session, "Users", &notice, content))
}

pub async fn delete_user(session: Session, State(api): State<ApiState>, Path(uid): Path<String>) -> Response {
    let result = admin::delete_user(api.as_ref(), session.bearer(), &uid).await;
    after_write(result, "/admin/users", "User disabled.", "/admin/users")
}

// --- Coursewares ---

pub async fn coursewares(session: Session, State(api): State<ApiState>, Query(notice): Query<Notice>) -> PageResult {
    let result = admin::list_coursewares(api.as_ref(), session.bearer()).await;
    let content = section(result, |coursewares| {
        if coursewares.is_empty() {
            return render::empty_block("No coursewares yet.");
        }
        let rows = coursewares
            .iter()
            .map(|cw| {
                let shared = cw.is_public.unwrap_or(false);
                vec![
                    html! { (cw.id) },
                    html! { (cw.topic) },
                    html! { @if let Some(teacher_id) = cw.teacher_id { (teacher_id) } },
                    html! { (if shared { "Public" } else { "Private" }) },
                    html! { (format_optional_datetime(&cw.created_at)) },
                    html! {
                        (link(&format!("/admin/coursewares/{}/edit", cw.id), "Edit"))
                        " "
                        (link(&format!("/admin/coursewares/{}/pdf", cw.id), "PDF"))
                        " "
                        (render::action_button(
                            &format!("/admin/coursewares/{}/share", cw.id),
                            if shared { "Unshare" } else { "Share" },
                        ))
                    },
                ]
            })
            .collect();
        render::table(&["ID", "Topic", "Teacher", "Visibility", "Created", ""], rows)
    })?;
    Ok(show(&session, "Coursewares", &notice, content))
}

/// Flips the public flag of a courseware.
pub async fn share_courseware(session: Session, State(api): State<ApiState>, Path(cid): Path<String>) -> Response {
    let result = admin::share_courseware(api.as_ref(), session.bearer(), &cid).await;
    after_write(result, "/admin/coursewares", "Sharing updated.", "/admin/coursewares")
}

fn edit_path(cid: &str) -> String {
    format!("/admin/coursewares/{}/edit", path_segment(cid))
}

pub async fn edit_courseware(
    session: Session,
    State(api): State<ApiState>,
    Path(cid): Path<String>,
    Query(notice): Query<Notice>,
) -> PageResult {
    let result = admin::courseware_preview(api.as_ref(), session.bearer(), &cid).await;
    let action = edit_path(&cid);
    let content = section(result, |preview| {
        html! {
            h2 { (preview.topic.as_deref().unwrap_or("")) }
            form method="post" action=(action) {
                textarea name="markdown" rows="30" { (preview.markdown) }
                button type="submit" { "Save" }
            }
        }
    })?;
    Ok(show(&session, "Edit courseware", &notice, content))
}

pub async fn update_courseware(
    session: Session,
    State(api): State<ApiState>,
    Path(cid): Path<String>,
    Form(form): Form<MarkdownForm>,
) -> Response {
    let back = edit_path(&cid);
    let result = admin::update_courseware(api.as_ref(), session.bearer(), &cid, &form.markdown).await;
    after_write(result, &back, "Courseware saved.", &back)
}

pub async fn courseware_pdf(session: Session, State(api): State<ApiState>, Path(cid): Path<String>) -> Response {
    let result = admin::courseware_pdf(api.as_ref(), session.bearer(), &cid).await;
    pdf_download(result, &format!("courseware_{}.pdf", cid), "/admin/coursewares")
}

// --- Public Document Library ---

pub async fn public_docs(session: Session, State(api): State<ApiState>, Query(notice): Query<Notice>) -> PageResult {
    let result = admin::list_public_docs(api.as_ref(), session.bearer()).await;
    let list = section(result, |docs| {
        if docs.is_empty() {
            return render::empty_block("The library is empty.");
        }
        let rows = docs
            .iter()
            .map(|d| {
                vec![
                    html! { (d.id) },
                    html! { (d.filename) },
                    html! { (format_optional_datetime(&d.uploaded_at)) },
                    render::action_button(&format!("/admin/public_docs/{}/delete", d.id), "Delete"),
                ]
            })
            .collect();
        render::table(&["ID", "File", "Uploaded", ""], rows)
    })?;
    let content = html! {
        form method="post" action="/admin/public_docs" enctype="multipart/form-data" {
            input type="file" name="file" required;
            button type="submit" { "Upload" }
        }
        (list)
    };
    Ok(show(&session, "Public documents", &notice, content))
}

/// upload_public_doc
///
/// [Admin Route] Relays the submitted file to the document library. Progress of
/// the outgoing transfer is reported to the log as it advances.
pub async fn upload_public_doc(session: Session, State(api): State<ApiState>, mut multipart: Multipart) -> Response {
    const BACK: &str = "/admin/public_docs";

    let mut file: Option<(String, Option<String>, Bytes)> = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => {
                tracing::warn!(error = %err, "Malformed upload form");
                return redirect_with_alert(BACK, "The upload could not be read.");
            }
        };
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("document").to_string();
        let content_type = field.content_type().map(str::to_string);
        match field.bytes().await {
            Ok(data) => file = Some((filename, content_type, data)),
            Err(err) => {
                tracing::warn!(error = %err, "Upload body could not be read");
                return redirect_with_alert(BACK, "The upload could not be read.");
            }
        }
    }

    let Some((filename, content_type, data)) = file.filter(|(name, _, _)| !name.is_empty()) else {
        return redirect_with_alert(BACK, "Please choose a file to upload.");
    };

    let size = data.len();
    let last = Arc::new(AtomicU8::new(0));
    let progress: ProgressFn = {
        let filename = filename.clone();
        let last = last.clone();
        Arc::new(move |percent| {
            last.store(percent, Ordering::Relaxed);
            tracing::debug!(filename = %filename, percent, "Upload progress");
        })
    };

    match admin::upload_public_doc(api.as_ref(), session.bearer(), &filename, content_type, data, progress).await {
        Ok(()) => {
            tracing::info!(
                filename = %filename,
                bytes = size,
                percent = last.load(Ordering::Relaxed),
                "Public document uploaded"
            );
            redirect_with_alert(BACK, &format!("Uploaded {}.", filename))
        }
        Err(err) => write_failed(err, BACK),
    }
}

pub async fn delete_public_doc(session: Session, State(api): State<ApiState>, Path(id): Path<String>) -> Response {
    let result = admin::delete_public_doc(api.as_ref(), session.bearer(), &id).await;
    after_write(result, "/admin/public_docs", "Document deleted.", "/admin/public_docs")
}
