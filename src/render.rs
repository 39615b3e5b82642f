//! Server-side HTML rendering.
//!
//! Pages are `maud` templates. Every interpolated value is escaped by the macro;
//! only fragments that are themselves `Markup` are embedded as they are.

use chrono::{DateTime, NaiveDateTime};
use maud::{DOCTYPE, Markup, html};
use serde_json::Value;

use crate::{
    models::{HomeworkResult, QuestionBlock},
    session::{Role, Session},
};

/// format_datetime
///
/// Renders API timestamps as `YYYY-MM-DD HH:MM`. Accepts RFC 3339 and the
/// naive ISO form the API emits; anything else is returned unchanged.
pub fn format_datetime(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y-%m-%d %H:%M").to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return dt.format("%Y-%m-%d %H:%M").to_string();
        }
    }
    raw.to_string()
}

pub fn format_optional_datetime(raw: &Option<String>) -> String {
    raw.as_deref().map(format_datetime).unwrap_or_default()
}

/// Wraps a body in a complete HTML document.
pub fn document(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { (title) }
            }
            body { (body) }
        }
    }
}

/// Navigation entries for each role's sidebar.
pub fn nav_links(role: Role) -> &'static [(&'static str, &'static str)] {
    match role {
        Role::Teacher => &[
            ("/teacher/lesson", "Lesson preparation"),
            ("/teacher/lesson/list", "Lesson list"),
            ("/teacher/exercise", "Exercise generation"),
            ("/teacher/exercise/list", "Exercise list"),
            ("/teacher/classes", "Classes"),
            ("/teacher/students", "Students"),
        ],
        Role::Student => &[
            ("/student/homeworks", "My homework"),
            ("/student/ai", "AI tutor"),
            ("/student/evaluate", "Learning evaluation"),
            ("/student/self_practice", "Self practice"),
            ("/student/classes", "My classes"),
        ],
        Role::Admin => &[
            ("/admin/users", "Users"),
            ("/admin/coursewares", "Coursewares"),
            ("/admin/public_docs", "Public documents"),
            ("/admin/dashboard", "Overview"),
        ],
    }
}

/// layout
///
/// Protected-page shell: greeting, role navigation, logout button, an optional
/// one-shot alert, then the page content.
pub fn layout(session: &Session, role: Role, title: &str, alert: Option<&str>, content: Markup) -> Markup {
    let body = html! {
        aside.sidebar {
            div.greeting { "Hello, " (role.label()) " " (session.username) }
            nav {
                ul {
                    @for (href, label) in nav_links(role) {
                        li { a href=(href) { (label) } }
                    }
                }
            }
            form method="post" action="/logout" {
                button type="submit" { "Log out" }
            }
        }
        main {
            h1 { (title) }
            @if let Some(message) = alert {
                (alert_banner(message))
            }
            (content)
        }
    };
    document(title, body)
}

pub fn alert_banner(message: &str) -> Markup {
    html! { div.alert role="alert" { (message) } }
}

/// Page-local failure text shown in place of content.
pub fn error_block(message: &str) -> Markup {
    html! { div.error { (message) } }
}

pub fn empty_block(message: &str) -> Markup {
    html! { p.empty { (message) } }
}

/// Markdown is shown verbatim; it is not rendered.
pub fn markdown_block(markdown: &str) -> Markup {
    html! { pre.markdown { (markdown) } }
}

pub fn json_block(value: &Value) -> Markup {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    html! { pre.json { (pretty) } }
}

pub fn link(href: &str, label: &str) -> Markup {
    html! { a href=(href) { (label) } }
}

/// A one-button form posting to `action`.
pub fn action_button(action: &str, label: &str) -> Markup {
    html! {
        form.inline method="post" action=(action) {
            button type="submit" { (label) }
        }
    }
}

pub fn table(headers: &[&str], rows: Vec<Vec<Markup>>) -> Markup {
    html! {
        table {
            thead {
                tr {
                    @for header in headers {
                        th { (header) }
                    }
                }
            }
            tbody {
                @for cells in rows {
                    tr {
                        @for cell in cells {
                            td { (cell) }
                        }
                    }
                }
            }
        }
    }
}

/// Read-only listing of generated questions.
pub fn question_list(blocks: &[QuestionBlock]) -> Markup {
    html! {
        @for block in blocks {
            section {
                h3 { (block.kind) }
                ol {
                    @for item in &block.items {
                        li {
                            (item.question)
                            @if let Some(options) = &item.options {
                                ul {
                                    @for option in options {
                                        li { (option) }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// question_form
///
/// Answer sheet. Choice items post `choice:<id>` with the option index, all
/// other items post `text:<id>`.
pub fn question_form(blocks: &[QuestionBlock], action: &str, submit_label: &str) -> Markup {
    html! {
        form method="post" action=(action) {
            @for (number, item) in blocks.iter().flat_map(|b| b.items.iter()).enumerate() {
                @let key = item.answer_key();
                fieldset {
                    legend { (number + 1) ". " (item.question) }
                    @match &item.options {
                        Some(options) => {
                            @for (idx, option) in options.iter().enumerate() {
                                label {
                                    input type="radio" name={ "choice:" (key) } value=(idx);
                                    " " (option)
                                }
                            }
                        }
                        None => {
                            textarea name={ "text:" (key) } rows="4" {}
                        }
                    }
                }
            }
            button type="submit" { (submit_label) }
        }
    }
}

/// homework_result
///
/// Graded submission: score, the original questions, what was answered and
/// the grader's feedback. Shared by the student and teacher views.
pub fn homework_result(result: &HomeworkResult) -> Markup {
    let score = match result.total_score {
        Some(total) => format!("{} / {}", result.score, total),
        None => result.score.to_string(),
    };
    html! {
        p.score { "Score: " (score) }
        @if let Some(exercise) = &result.exercise {
            h2 { (exercise.subject) }
            (question_list(&exercise.prompt))
        }
        h2 { "Submitted answers" }
        (json_block(&result.student_answers))
        h2 { "Feedback" }
        (json_block(&result.feedback))
    }
}

/// Landing content for a role root: one card per navigation entry.
pub fn role_home(role: Role) -> Markup {
    html! {
        ul.cards {
            @for (href, label) in nav_links(role) {
                li.card { a href=(href) { (label) } }
            }
        }
    }
}

// --- Public Pages ---

/// login_page
///
/// `notice` carries one-shot messages such as a completed registration.
pub fn login_page(notice: Option<&str>, error: Option<&str>, username: &str) -> Markup {
    let body = html! {
        main.login {
            h1 { "AI Education Platform" }
            h2 { "Sign in" }
            @if let Some(message) = notice {
                (alert_banner(message))
            }
            @if let Some(message) = error {
                (error_block(message))
            }
            form method="post" action="/login" {
                label { "Username " input name="username" value=(username) required autocomplete="username"; }
                label { "Password " input type="password" name="password" required autocomplete="current-password"; }
                button type="submit" { "Sign in" }
            }
            a href="/register" { "No account yet? Register" }
        }
    };
    document("Sign in", body)
}

pub fn register_page(error: Option<&str>, username: &str) -> Markup {
    let body = html! {
        main.register {
            h1 { "Register" }
            @if let Some(message) = error {
                (error_block(message))
            }
            form method="post" action="/register" {
                label { "Username " input name="username" value=(username) required; }
                label { "Password " input type="password" name="password" required; }
                label {
                    "Role "
                    select name="role" {
                        @for role in Role::ALL {
                            option value=(role.as_str()) { (role.label()) }
                        }
                    }
                }
                button type="submit" { "Register" }
            }
            a href="/login" { "Already registered? Sign in" }
        }
    };
    document("Register", body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionItem;
    use serde_json::json;

    #[test]
    fn interpolated_text_is_escaped() {
        let html = markdown_block("<script>alert(1) & \"y\"</script>").into_string();
        assert_eq!(
            html,
            "<pre class=\"markdown\">&lt;script&gt;alert(1) &amp; &quot;y&quot;&lt;/script&gt;</pre>"
        );
        assert_eq!(empty_block("plain 文本").into_string(), "<p class=\"empty\">plain 文本</p>");
    }

    #[test]
    fn attribute_values_cannot_break_out() {
        let html = link("/x\" onclick=\"steal()", "go").into_string();
        assert_eq!(html, "<a href=\"/x&quot; onclick=&quot;steal()\">go</a>");
    }

    #[test]
    fn format_datetime_accepts_api_shapes() {
        assert_eq!(format_datetime("2024-05-01T08:03:09.123456"), "2024-05-01 08:03");
        assert_eq!(format_datetime("2024-05-01T08:03:09+08:00"), "2024-05-01 08:03");
        assert_eq!(format_datetime("2024-05-01 08:03:09"), "2024-05-01 08:03");
        assert_eq!(format_datetime("yesterday"), "yesterday");
        assert_eq!(format_datetime(""), "");
    }

    #[test]
    fn layout_escapes_username_and_lists_role_links() {
        let session = Session::signed_in("t", Role::Student, "<b>mallory</b>");
        let content = html! { p { "x" } };
        let html = layout(&session, Role::Student, "Homework", Some("Saved"), content).into_string();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("&lt;b&gt;mallory&lt;/b&gt;"));
        assert!(html.contains("/student/self_practice"));
        assert!(!html.contains("/admin/users"));
        assert!(html.contains("action=\"/logout\""));
        assert!(html.contains("role=\"alert\""));
        assert!(html.contains("<p>x</p>"));
    }

    #[test]
    fn question_form_names_fields_by_kind() {
        let blocks = vec![QuestionBlock {
            kind: "mcq".to_string(),
            items: vec![
                QuestionItem {
                    id: json!(1),
                    question: "2+2?".to_string(),
                    options: Some(vec!["3".to_string(), "4".to_string()]),
                },
                QuestionItem {
                    id: json!("q2"),
                    question: "Explain".to_string(),
                    options: None,
                },
            ],
        }];
        let html = question_form(&blocks, "/student/homeworks/5/submit", "Submit").into_string();
        assert!(html.contains("name=\"choice:1\" value=\"1\""));
        assert!(html.contains("name=\"text:q2\""));
    }
}
