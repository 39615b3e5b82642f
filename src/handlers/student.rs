use axum::{
    Form,
    extract::{Path, Query, State},
    response::Response,
};
use maud::{Markup, html};
use serde::Deserialize;
use serde_json::Value;

use super::{
    Notice, after_write, answers_from_form, page, pdf_download, redirect_with_alert, section, write_failed,
};
use crate::{
    api::{ApiState, path_segment, student},
    models::Practice,
    render::{self, format_optional_datetime, link},
    session::{Role, Session},
};

type PageResult = Result<Response, Response>;

#[derive(Debug, Deserialize)]
pub struct QuestionForm {
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Deserialize)]
pub struct TopicForm {
    #[serde(default)]
    pub topic: String,
}

#[derive(Debug, Deserialize)]
pub struct JoinForm {
    #[serde(default)]
    pub class_id: String,
}

fn show(session: &Session, title: &str, notice: &Notice, content: Markup) -> Response {
    page(session, Role::Student, title, notice, content)
}

pub async fn home(session: Session, Query(notice): Query<Notice>) -> Response {
    show(&session, "Student workspace", &notice, render::role_home(Role::Student))
}

// --- Homework ---

/// homeworks
///
/// [Student Route] Assigned homework with the action each status allows:
/// answer it, wait for grading, or read the result.
pub async fn homeworks(session: Session, State(api): State<ApiState>, Query(notice): Query<Notice>) -> PageResult {
    let result = student::list_homeworks(api.as_ref(), session.bearer()).await;
    let content = section(result, |entries| {
        if entries.is_empty() {
            return render::empty_block("No homework assigned.");
        }
        let rows = entries
            .iter()
            .map(|hw| {
                let action = match hw.status.as_str() {
                    "completed" => link(&format!("/student/homeworks/result/{}", hw.homework_id), "View result"),
                    "grading" => html! { "Grading" },
                    _ => link(&format!("/student/homeworks/{}", hw.homework_id), "Start"),
                };
                vec![
                    html! { (hw.homework_id) },
                    html! { (hw.subject.as_deref().unwrap_or("")) },
                    html! { (format_optional_datetime(&hw.assigned_at)) },
                    html! { (status_label(&hw.status)) },
                    action,
                ]
            })
            .collect();
        render::table(&["ID", "Subject", "Assigned", "Status", ""], rows)
    })?;
    Ok(show(&session, "My homework", &notice, content))
}

fn status_label(status: &str) -> &str {
    match status {
        "not_submitted" => "Not submitted",
        "grading" => "Grading",
        "completed" => "Completed",
        other => other,
    }
}

fn homework_path(hw_id: &str) -> String {
    format!("/student/homeworks/{}", path_segment(hw_id))
}

pub async fn homework_detail(
    session: Session,
    State(api): State<ApiState>,
    Path(hw_id): Path<String>,
    Query(notice): Query<Notice>,
) -> PageResult {
    let result = student::homework_questions(api.as_ref(), session.bearer(), &hw_id).await;
    let action = format!("{}/submit", homework_path(&hw_id));
    let content = section(result, |hw| {
        html! {
            h2 { (hw.subject) }
            (render::question_form(&hw.prompt, &action, "Submit"))
        }
    })?;
    Ok(show(&session, "Homework", &notice, content))
}

pub async fn submit_homework(
    session: Session,
    State(api): State<ApiState>,
    Path(hw_id): Path<String>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let answers = answers_from_form(fields);
    let result = student::submit_homework(api.as_ref(), session.bearer(), &hw_id, answers).await;
    after_write(
        result,
        "/student/homeworks",
        "Submitted. Grading is in progress.",
        &homework_path(&hw_id),
    )
}

pub async fn homework_result(
    session: Session,
    State(api): State<ApiState>,
    Path(hw_id): Path<String>,
    Query(notice): Query<Notice>,
) -> PageResult {
    let result = student::homework_result(api.as_ref(), session.bearer(), &hw_id).await;
    let content = section(result, |detail| render::homework_result(&detail))?;
    Ok(show(&session, "Homework result", &notice, content))
}

// --- AI Tutor ---

pub async fn ai_sessions(session: Session, State(api): State<ApiState>, Query(notice): Query<Notice>) -> PageResult {
    let result = student::list_chat_sessions(api.as_ref(), session.bearer()).await;
    let list = section(result, |sessions| {
        if sessions.is_empty() {
            return render::empty_block("No conversations yet.");
        }
        let rows = sessions
            .iter()
            .map(|s| {
                let title = if s.title.is_empty() { "Untitled" } else { s.title.as_str() };
                vec![
                    link(&format!("/student/ai/{}", s.id), title),
                    html! { (format_optional_datetime(&s.created_at)) },
                ]
            })
            .collect();
        render::table(&["Conversation", "Started"], rows)
    })?;
    let content = html! {
        (render::action_button("/student/ai/new", "New conversation"))
        (list)
    };
    Ok(show(&session, "AI tutor", &notice, content))
}

pub async fn new_ai_session(session: Session, State(api): State<ApiState>) -> Response {
    match student::create_chat_session(api.as_ref(), session.bearer()).await {
        Ok(chat) => redirect_with_alert(&format!("/student/ai/{}", chat.id), ""),
        Err(err) => write_failed(err, "/student/ai"),
    }
}

fn conversation_path(session_id: &str) -> String {
    format!("/student/ai/{}", path_segment(session_id))
}

pub async fn ai_session(
    session: Session,
    State(api): State<ApiState>,
    Path(session_id): Path<String>,
    Query(notice): Query<Notice>,
) -> PageResult {
    let result = student::chat_messages(api.as_ref(), session.bearer(), &session_id).await;
    let transcript = section(result, |messages| {
        html! {
            @for m in &messages {
                div class={ "message " (m.role) } {
                    span.time { (format_optional_datetime(&m.created_at)) }
                    (render::markdown_block(&m.content))
                }
            }
        }
    })?;
    let base = conversation_path(&session_id);
    let content = html! {
        div.transcript { (transcript) }
        form method="post" action=(base) {
            textarea name="question" rows="3" required {}
            button type="submit" { "Ask" }
        }
        (render::action_button(&format!("{}/delete", base), "Delete conversation"))
    };
    Ok(show(&session, "AI tutor", &notice, content))
}

/// ask
///
/// [Student Route] Sends one question and returns to the conversation, where
/// the tutor's reply now appears in the transcript.
pub async fn ask(
    session: Session,
    State(api): State<ApiState>,
    Path(session_id): Path<String>,
    Form(form): Form<QuestionForm>,
) -> Response {
    let back = conversation_path(&session_id);
    let question = form.question.trim();
    if question.is_empty() {
        return redirect_with_alert(&back, "Please enter a question.");
    }
    let result = student::ask(api.as_ref(), session.bearer(), &session_id, question).await;
    after_write(result, &back, "", &back)
}

pub async fn delete_ai_session(session: Session, State(api): State<ApiState>, Path(session_id): Path<String>) -> Response {
    let result = student::delete_chat_session(api.as_ref(), session.bearer(), &session_id).await;
    after_write(result, "/student/ai", "Conversation deleted.", &conversation_path(&session_id))
}

// --- Learning Evaluation ---

pub async fn evaluate(session: Session, State(api): State<ApiState>, Query(notice): Query<Notice>) -> PageResult {
    let result = student::analysis(api.as_ref(), session.bearer()).await;
    let content = section(result, |analysis| match analysis.get("analysis") {
        Some(Value::String(text)) if text.is_empty() => {
            render::empty_block("No analysis yet. Complete some homework first.")
        }
        Some(Value::String(text)) => render::markdown_block(text),
        _ => render::json_block(&analysis),
    })?;
    Ok(show(&session, "Learning evaluation", &notice, content))
}

// --- Self Practice ---

pub async fn practices(session: Session, State(api): State<ApiState>, Query(notice): Query<Notice>) -> PageResult {
    let result = student::list_practices(api.as_ref(), session.bearer()).await;
    let list = section(result, |practices| {
        if practices.is_empty() {
            return render::empty_block("No practice sets yet.");
        }
        let rows = practices
            .iter()
            .map(|p| {
                vec![
                    link(&format!("/student/self_practice/{}", p.id), &p.topic),
                    html! { (p.status) },
                    html! { @if let Some(score) = p.score { (score) } },
                ]
            })
            .collect();
        render::table(&["Topic", "Status", "Score"], rows)
    })?;
    let content = html! {
        form method="post" action="/student/self_practice" {
            label { "Topic " input name="topic" required; }
            button type="submit" { "Generate practice" }
        }
        (list)
    };
    Ok(show(&session, "Self practice", &notice, content))
}

pub async fn generate_practice(session: Session, State(api): State<ApiState>, Form(form): Form<TopicForm>) -> Response {
    let topic = form.topic.trim();
    if topic.is_empty() {
        return redirect_with_alert("/student/self_practice", "Please enter a topic.");
    }
    match student::generate_practice(api.as_ref(), session.bearer(), topic).await {
        Ok(practice) => redirect_with_alert(&format!("/student/self_practice/{}", practice.id), "Practice generated."),
        Err(err) => write_failed(err, "/student/self_practice"),
    }
}

fn practice_path(id: &str) -> String {
    format!("/student/self_practice/{}", path_segment(id))
}

/// practice_detail
///
/// Unanswered sets render as an answer sheet; graded sets show the score and
/// feedback next to the questions.
pub async fn practice_detail(
    session: Session,
    State(api): State<ApiState>,
    Path(id): Path<String>,
    Query(notice): Query<Notice>,
) -> PageResult {
    let result = student::practice(api.as_ref(), session.bearer(), &id).await;
    let content = section(result, |practice| practice_view(&practice, &practice_path(&id)))?;
    Ok(show(&session, "Self practice", &notice, content))
}

fn practice_view(practice: &Practice, base: &str) -> Markup {
    html! {
        h2 { (practice.topic) }
        p { (link(&format!("{}/pdf", base), "Download PDF")) }
        @match &practice.feedback {
            Some(feedback) if practice.status == "completed" => {
                p.score { "Score: " (practice.score.unwrap_or_default()) }
                (render::question_list(&practice.questions))
                h2 { "Feedback" }
                (render::json_block(feedback))
            }
            _ => {
                (render::question_form(&practice.questions, &format!("{}/submit", base), "Submit"))
            }
        }
    }
}

pub async fn submit_practice(
    session: Session,
    State(api): State<ApiState>,
    Path(id): Path<String>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let back = practice_path(&id);
    let result = student::submit_practice(api.as_ref(), session.bearer(), &id, answers_from_form(fields)).await;
    after_write(result, &back, "Practice graded.", &back)
}

pub async fn practice_pdf(session: Session, State(api): State<ApiState>, Path(id): Path<String>) -> Response {
    let result = student::practice_pdf(api.as_ref(), session.bearer(), &id).await;
    pdf_download(result, &format!("practice_{}.pdf", id), &practice_path(&id))
}

// --- Classes ---

pub async fn classes(session: Session, State(api): State<ApiState>, Query(notice): Query<Notice>) -> PageResult {
    let result = student::my_classes(api.as_ref(), session.bearer()).await;
    let list = section(result, |classes| {
        if classes.is_empty() {
            return render::empty_block("You have not joined any class.");
        }
        let rows = classes
            .iter()
            .map(|c| {
                vec![
                    html! { (c.id) },
                    link(&format!("/student/classes/{}", c.id), &c.name),
                    html! { (c.subject) },
                ]
            })
            .collect();
        render::table(&["ID", "Name", "Subject"], rows)
    })?;
    let content = html! {
        (list)
        h2 { "Join a class" }
        form method="post" action="/student/classes" {
            label { "Class ID " input name="class_id" inputmode="numeric" required; }
            button type="submit" { "Join" }
        }
    };
    Ok(show(&session, "My classes", &notice, content))
}

pub async fn join_class(session: Session, State(api): State<ApiState>, Form(form): Form<JoinForm>) -> Response {
    let class_id = match form.class_id.trim().parse::<i64>() {
        Ok(id) => id,
        Err(_) => return redirect_with_alert("/student/classes", "Class ID must be a number."),
    };
    let result = student::join_class(api.as_ref(), session.bearer(), class_id).await;
    after_write(result, "/student/classes", "Joined class.", "/student/classes")
}

fn class_path(cid: &str) -> String {
    format!("/student/classes/{}", path_segment(cid))
}

pub async fn class_info(
    session: Session,
    State(api): State<ApiState>,
    Path(cid): Path<String>,
    Query(notice): Query<Notice>,
) -> PageResult {
    let result = student::class_info(api.as_ref(), session.bearer(), &cid).await;
    let leave = format!("{}/leave", class_path(&cid));
    let content = section(result, |class| {
        html! {
            h2 { (class.name) }
            p { "Subject: " (class.subject) }
            p { "Students: " (class.student_count) }
            (render::action_button(&leave, "Leave class"))
        }
    })?;
    Ok(show(&session, "Class", &notice, content))
}

pub async fn leave_class(session: Session, State(api): State<ApiState>, Path(cid): Path<String>) -> Response {
    let result = student::leave_class(api.as_ref(), session.bearer(), &cid).await;
    after_write(result, "/student/classes", "Left class.", &class_path(&cid))
}
