use crate::{
    AppState,
    guard::{self, TEACHER_ROLES},
    handlers::teacher,
    session::Role,
};
use axum::{
    Router, middleware,
    response::Redirect,
    routing::{get, post},
};

/// Teacher Router Module
///
/// Lesson preparation, exercise authoring, class management and student
/// insight. Nested under `/teacher`.
///
/// Access Control:
/// The guard is attached with `layer` rather than `route_layer` so it also
/// wraps the fallback. An unauthorized visitor to `/teacher/anything` is sent
/// to `/login`, never to the default page.
pub fn teacher_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(teacher::home))
        // --- Lessons ---
        .route("/lesson", get(teacher::lesson_page).post(teacher::prepare_lesson))
        .route("/lesson/pdf", post(teacher::lesson_pdf))
        .route("/lesson/list", get(teacher::lesson_list))
        .route("/lesson/preview/{cw_id}", get(teacher::lesson_preview))
        .route("/lesson/preview/{cw_id}/pdf", get(teacher::lesson_preview_pdf))
        // --- Exercises ---
        .route("/exercise", get(teacher::exercise_page).post(teacher::generate_exercise))
        .route("/exercise/save", post(teacher::save_exercise))
        .route("/exercise/list", get(teacher::exercise_list))
        .route("/exercise/preview/{ex_id}", get(teacher::exercise_preview))
        .route("/exercise/stats/{ex_id}", get(teacher::exercise_stats))
        .route("/exercise/{ex_id}/assign", post(teacher::assign_exercise))
        .route("/exercise/{ex_id}/questions.pdf", get(teacher::questions_pdf))
        .route("/exercise/{ex_id}/answers.pdf", get(teacher::answers_pdf))
        // --- Classes ---
        .route("/classes", get(teacher::classes).post(teacher::create_class))
        .route("/classes/{cid}", get(teacher::class_detail))
        .route("/classes/{cid}/delete", post(teacher::delete_class))
        .route("/classes/{cid}/students/{sid}/remove", post(teacher::remove_student))
        // --- Students ---
        .route("/students", get(teacher::students))
        .route("/students/{sid}", get(teacher::student_detail))
        .route("/students/{sid}/homework/{hw_id}", get(teacher::student_homework))
        // Unknown sub-paths land on lesson preparation.
        .fallback(|| async { Redirect::to(Role::Teacher.default_page()) })
        // A known path requested with the wrong method goes the same way.
        .method_not_allowed_fallback(|| async { Redirect::to(Role::Teacher.default_page()) })
        .layer(middleware::from_fn_with_state(TEACHER_ROLES, guard::require_roles))
}
