use axum::{
    Form,
    extract::{Path, Query, State},
    response::Response,
};
use maud::{Markup, html};
use serde::Deserialize;

use super::{Notice, after_write, page, pdf_download, redirect_with_alert, section, write_failed};
use crate::{
    api::{ApiState, path_segment, teacher},
    models::{ExerciseDraft, ExerciseRequest},
    render::{self, format_optional_datetime, link},
    session::{Role, Session},
};

type PageResult = Result<Response, Response>;

#[derive(Debug, Deserialize)]
pub struct TopicForm {
    #[serde(default)]
    pub topic: String,
}

#[derive(Debug, Deserialize)]
pub struct DraftForm {
    pub draft: String,
}

#[derive(Debug, Deserialize)]
pub struct ClassForm {
    pub name: String,
    #[serde(default)]
    pub subject: String,
}

fn show(session: &Session, title: &str, notice: &Notice, content: Markup) -> Response {
    page(session, Role::Teacher, title, notice, content)
}

pub async fn home(session: Session, Query(notice): Query<Notice>) -> Response {
    show(&session, "Teacher workspace", &notice, render::role_home(Role::Teacher))
}

// --- Lesson Preparation ---

fn lesson_form(topic: &str) -> Markup {
    html! {
        form method="post" action="/teacher/lesson" {
            label { "Topic " input name="topic" value=(topic) required; }
            button type="submit" { "Generate lesson" }
            button type="submit" formaction="/teacher/lesson/pdf" { "Download as PDF" }
        }
    }
}

pub async fn lesson_page(session: Session, Query(notice): Query<Notice>) -> Response {
    show(&session, "Lesson preparation", &notice, lesson_form(""))
}

/// prepare_lesson
///
/// [Teacher Route] Generates a lesson plan for the topic and shows the
/// markdown under the form. Generation can take a long time.
pub async fn prepare_lesson(
    session: Session,
    State(api): State<ApiState>,
    Form(form): Form<TopicForm>,
) -> PageResult {
    let topic = form.topic.trim();
    let notice = Notice::default();
    if topic.is_empty() {
        let content = html! { (render::error_block("Please enter a topic.")) (lesson_form(topic)) };
        return Ok(show(&session, "Lesson preparation", &notice, content));
    }

    let result = teacher::prepare_lesson(api.as_ref(), session.bearer(), topic).await;
    let body = section(result, |markdown| render::markdown_block(&markdown))?;
    let content = html! { (lesson_form(topic)) (body) };
    Ok(show(&session, "Lesson preparation", &notice, content))
}

pub async fn lesson_pdf(session: Session, State(api): State<ApiState>, Form(form): Form<TopicForm>) -> Response {
    let topic = form.topic.trim();
    if topic.is_empty() {
        return redirect_with_alert("/teacher/lesson", "Please enter a topic.");
    }
    let result = teacher::lesson_pdf(api.as_ref(), session.bearer(), topic).await;
    pdf_download(result, "lesson.pdf", "/teacher/lesson")
}

pub async fn lesson_list(session: Session, State(api): State<ApiState>, Query(notice): Query<Notice>) -> PageResult {
    let result = teacher::list_lessons(api.as_ref(), session.bearer()).await;
    let content = section(result, |lessons| {
        if lessons.is_empty() {
            return render::empty_block("No lessons yet.");
        }
        let rows = lessons
            .iter()
            .map(|cw| {
                vec![
                    html! { (cw.id) },
                    html! { (cw.topic) },
                    html! { (format_optional_datetime(&cw.created_at)) },
                    link(&format!("/teacher/lesson/preview/{}", cw.id), "Preview"),
                ]
            })
            .collect();
        render::table(&["ID", "Topic", "Created", ""], rows)
    })?;
    Ok(show(&session, "Lesson list", &notice, content))
}

pub async fn lesson_preview(
    session: Session,
    State(api): State<ApiState>,
    Path(cw_id): Path<String>,
    Query(notice): Query<Notice>,
) -> PageResult {
    let result = teacher::lesson_preview(api.as_ref(), session.bearer(), &cw_id).await;
    let pdf = format!("/teacher/lesson/preview/{}/pdf", path_segment(&cw_id));
    let content = section(result, |preview| {
        html! {
            h2 { (preview.topic.as_deref().unwrap_or("")) }
            p { (link(&pdf, "Download PDF")) }
            (render::markdown_block(&preview.markdown))
        }
    })?;
    Ok(show(&session, "Lesson preview", &notice, content))
}

pub async fn lesson_preview_pdf(session: Session, State(api): State<ApiState>, Path(cw_id): Path<String>) -> Response {
    let result = teacher::courseware_pdf(api.as_ref(), session.bearer(), &cw_id).await;
    let back = format!("/teacher/lesson/preview/{}", path_segment(&cw_id));
    pdf_download(result, &format!("courseware_{}.pdf", cw_id), &back)
}

// --- Exercises ---

fn exercise_form(request: Option<&ExerciseRequest>) -> Markup {
    let (topic, mcq, fill, short, prog) = match request {
        Some(r) => (r.topic.as_str(), r.num_mcq, r.num_fill_blank, r.num_short_answer, r.num_programming),
        None => ("", 3, 2, 1, 0),
    };
    html! {
        form method="post" action="/teacher/exercise" {
            label { "Topic " input name="topic" value=(topic) required; }
            label { "Multiple choice " input type="number" min="0" name="num_mcq" value=(mcq); }
            label { "Fill in the blank " input type="number" min="0" name="num_fill_blank" value=(fill); }
            label { "Short answer " input type="number" min="0" name="num_short_answer" value=(short); }
            label { "Programming " input type="number" min="0" name="num_programming" value=(prog); }
            button type="submit" { "Generate exercise" }
        }
    }
}

pub async fn exercise_page(session: Session, Query(notice): Query<Notice>) -> Response {
    show(&session, "Exercise generation", &notice, exercise_form(None))
}

/// generate_exercise
///
/// [Teacher Route] Generates questions and answers. The draft travels back in
/// a hidden field so the teacher can save it without regenerating.
pub async fn generate_exercise(
    session: Session,
    State(api): State<ApiState>,
    Form(mut request): Form<ExerciseRequest>,
) -> PageResult {
    request.topic = request.topic.trim().to_string();
    let notice = Notice::default();
    if request.topic.is_empty() {
        let content = html! {
            (render::error_block("Please enter a topic."))
            (exercise_form(Some(&request)))
        };
        return Ok(show(&session, "Exercise generation", &notice, content));
    }

    let result = teacher::generate_exercise(api.as_ref(), session.bearer(), &request).await;
    let draft = section(result, |draft| draft_view(&draft))?;
    let content = html! { (exercise_form(Some(&request))) (draft) };
    Ok(show(&session, "Exercise generation", &notice, content))
}

fn draft_view(draft: &ExerciseDraft) -> Markup {
    let serialized = serde_json::to_string(draft).unwrap_or_default();
    html! {
        h2 { (draft.topic) }
        (render::question_list(&draft.questions))
        h2 { "Answers" }
        (render::json_block(&draft.answers))
        form method="post" action="/teacher/exercise/save" {
            input type="hidden" name="draft" value=(serialized);
            button type="submit" { "Save exercise" }
        }
    }
}

pub async fn save_exercise(session: Session, State(api): State<ApiState>, Form(form): Form<DraftForm>) -> Response {
    let draft: ExerciseDraft = match serde_json::from_str(&form.draft) {
        Ok(draft) => draft,
        Err(err) => {
            tracing::warn!(error = %err, "Submitted exercise draft is malformed");
            return redirect_with_alert("/teacher/exercise", "The generated exercise could not be read, please generate it again.");
        }
    };

    match teacher::save_exercise(api.as_ref(), session.bearer(), &draft).await {
        Ok(saved) => redirect_with_alert(&format!("/teacher/exercise/preview/{}", saved.id), "Exercise saved."),
        Err(err) => write_failed(err, "/teacher/exercise"),
    }
}

pub async fn exercise_list(session: Session, State(api): State<ApiState>, Query(notice): Query<Notice>) -> PageResult {
    let result = teacher::list_exercises(api.as_ref(), session.bearer()).await;
    let content = section(result, |exercises| {
        if exercises.is_empty() {
            return render::empty_block("No exercises yet.");
        }
        let rows = exercises
            .iter()
            .map(|ex| {
                vec![
                    html! { (ex.id) },
                    html! { (ex.subject) },
                    html! { (format_optional_datetime(&ex.created_at)) },
                    html! {
                        (link(&format!("/teacher/exercise/preview/{}", ex.id), "Preview"))
                        " "
                        (link(&format!("/teacher/exercise/stats/{}", ex.id), "Statistics"))
                    },
                ]
            })
            .collect();
        render::table(&["ID", "Subject", "Created", ""], rows)
    })?;
    Ok(show(&session, "Exercise list", &notice, content))
}

pub async fn exercise_preview(
    session: Session,
    State(api): State<ApiState>,
    Path(ex_id): Path<String>,
    Query(notice): Query<Notice>,
) -> PageResult {
    let result = teacher::exercise_preview(api.as_ref(), session.bearer(), &ex_id).await;
    let base = format!("/teacher/exercise/{}", path_segment(&ex_id));
    let content = section(result, |ex| {
        html! {
            h2 { (ex.subject) }
            p {
                (link(&format!("{}/questions.pdf", base), "Questions PDF"))
                " "
                (link(&format!("{}/answers.pdf", base), "Answers PDF"))
            }
            (render::action_button(&format!("{}/assign", base), "Assign to my classes"))
            (render::question_list(&ex.prompt))
            h2 { "Answers" }
            (render::json_block(&ex.answers))
        }
    })?;
    Ok(show(&session, "Exercise preview", &notice, content))
}

fn preview_path(ex_id: &str) -> String {
    format!("/teacher/exercise/preview/{}", path_segment(ex_id))
}

pub async fn assign_exercise(session: Session, State(api): State<ApiState>, Path(ex_id): Path<String>) -> Response {
    let back = preview_path(&ex_id);
    let result = teacher::assign_exercise(api.as_ref(), session.bearer(), &ex_id).await;
    after_write(result, &back, "Exercise assigned.", &back)
}

pub async fn questions_pdf(session: Session, State(api): State<ApiState>, Path(ex_id): Path<String>) -> Response {
    let result = teacher::exercise_pdf(api.as_ref(), session.bearer(), &ex_id, "questions").await;
    pdf_download(result, &format!("exercise_{}_questions.pdf", ex_id), &preview_path(&ex_id))
}

pub async fn answers_pdf(session: Session, State(api): State<ApiState>, Path(ex_id): Path<String>) -> Response {
    let result = teacher::exercise_pdf(api.as_ref(), session.bearer(), &ex_id, "answers").await;
    pdf_download(result, &format!("exercise_{}_answers.pdf", ex_id), &preview_path(&ex_id))
}

pub async fn exercise_stats(
    session: Session,
    State(api): State<ApiState>,
    Path(ex_id): Path<String>,
    Query(notice): Query<Notice>,
) -> PageResult {
    let result = teacher::exercise_stats(api.as_ref(), session.bearer(), &ex_id).await;
    let content = section(result, |stats| render::json_block(&stats))?;
    Ok(show(&session, "Exercise statistics", &notice, content))
}

// --- Classes ---

pub async fn classes(session: Session, State(api): State<ApiState>, Query(notice): Query<Notice>) -> PageResult {
    let result = teacher::list_classes(api.as_ref(), session.bearer()).await;
    let list = section(result, |classes| {
        if classes.is_empty() {
            return render::empty_block("No classes yet.");
        }
        let rows = classes
            .iter()
            .map(|c| {
                vec![
                    html! { (c.id) },
                    link(&format!("/teacher/classes/{}", c.id), &c.name),
                    html! { (c.subject) },
                    html! { (c.student_count) },
                ]
            })
            .collect();
        render::table(&["ID", "Name", "Subject", "Students"], rows)
    })?;
    let content = html! {
        (list)
        h2 { "Create a class" }
        form method="post" action="/teacher/classes" {
            label { "Name " input name="name" required; }
            label { "Subject " input name="subject"; }
            button type="submit" { "Create" }
        }
    };
    Ok(show(&session, "Classes", &notice, content))
}

pub async fn create_class(session: Session, State(api): State<ApiState>, Form(form): Form<ClassForm>) -> Response {
    let name = form.name.trim();
    if name.is_empty() {
        return redirect_with_alert("/teacher/classes", "Please enter a class name.");
    }
    let result = teacher::create_class(api.as_ref(), session.bearer(), name, form.subject.trim()).await;
    after_write(result, "/teacher/classes", "Class created.", "/teacher/classes")
}

fn class_path(cid: &str) -> String {
    format!("/teacher/classes/{}", path_segment(cid))
}

pub async fn class_detail(
    session: Session,
    State(api): State<ApiState>,
    Path(cid): Path<String>,
    Query(notice): Query<Notice>,
) -> PageResult {
    let result = teacher::class_detail(api.as_ref(), session.bearer(), &cid).await;
    let base = class_path(&cid);
    let content = section(result, |class| {
        let rows = class
            .students
            .iter()
            .map(|s| {
                vec![
                    html! { (s.id) },
                    link(&format!("/teacher/students/{}", s.id), &s.username),
                    render::action_button(&format!("{}/students/{}/remove", base, s.id), "Remove"),
                ]
            })
            .collect();
        html! {
            h2 { (class.info.name) " (" (class.info.subject) ")" }
            p { "Class ID: " (class.info.id) }
            (render::table(&["ID", "Student", ""], rows))
            (render::action_button(&format!("{}/delete", base), "Delete class"))
        }
    })?;
    Ok(show(&session, "Class", &notice, content))
}

pub async fn delete_class(session: Session, State(api): State<ApiState>, Path(cid): Path<String>) -> Response {
    let result = teacher::delete_class(api.as_ref(), session.bearer(), &cid).await;
    after_write(result, "/teacher/classes", "Class deleted.", &class_path(&cid))
}

pub async fn remove_student(
    session: Session,
    State(api): State<ApiState>,
    Path((cid, sid)): Path<(String, String)>,
) -> Response {
    let back = class_path(&cid);
    let result = teacher::remove_student(api.as_ref(), session.bearer(), &cid, &sid).await;
    after_write(result, &back, "Student removed from class.", &back)
}

// --- Student Insight ---

pub async fn students(session: Session, State(api): State<ApiState>, Query(notice): Query<Notice>) -> PageResult {
    let result = teacher::list_students(api.as_ref(), session.bearer()).await;
    let content = section(result, |students| {
        if students.is_empty() {
            return render::empty_block("No students in your classes yet.");
        }
        let rows = students
            .iter()
            .map(|s| vec![html! { (s.id) }, link(&format!("/teacher/students/{}", s.id), &s.username)])
            .collect();
        render::table(&["ID", "Student"], rows)
    })?;
    Ok(show(&session, "Students", &notice, content))
}

/// student_detail
///
/// [Teacher Route] Learning analysis plus submission history for one student.
/// Both halves load independently; one failing does not hide the other.
pub async fn student_detail(
    session: Session,
    State(api): State<ApiState>,
    Path(sid): Path<String>,
    Query(notice): Query<Notice>,
) -> PageResult {
    let (analysis, homeworks) = tokio::join!(
        teacher::student_analysis(api.as_ref(), session.bearer(), &sid),
        teacher::student_homeworks(api.as_ref(), session.bearer(), &sid),
    );

    let base = format!("/teacher/students/{}", path_segment(&sid));
    let analysis = section(analysis, |value| render::json_block(&value))?;
    let homeworks = section(homeworks, |submissions| {
        if submissions.is_empty() {
            return render::empty_block("No submissions yet.");
        }
        let rows = submissions
            .iter()
            .map(|s| {
                vec![
                    link(
                        &format!("{}/homework/{}", base, s.homework_id),
                        &s.homework_id.to_string(),
                    ),
                    html! { (s.subject) },
                    html! { (s.score) },
                    html! { (format_optional_datetime(&s.submitted_at)) },
                ]
            })
            .collect();
        render::table(&["Homework", "Subject", "Score", "Submitted"], rows)
    })?;

    let content = html! {
        h2 { "Analysis" }
        (analysis)
        h2 { "Homework" }
        (homeworks)
    };
    Ok(show(&session, "Student", &notice, content))
}

pub async fn student_homework(
    session: Session,
    State(api): State<ApiState>,
    Path((sid, hw_id)): Path<(String, String)>,
    Query(notice): Query<Notice>,
) -> PageResult {
    let result = teacher::student_homework_detail(api.as_ref(), session.bearer(), &sid, &hw_id).await;
    let content = match result {
        Err(err) if err.is_not_found() => render::empty_block("This homework has not been submitted yet."),
        other => section(other, |detail| render::homework_result(&detail))?,
    };
    Ok(show(&session, "Submission", &notice, content))
}
