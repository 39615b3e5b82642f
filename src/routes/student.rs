use crate::{
    AppState,
    guard::{self, STUDENT_ROLES},
    handlers::student,
    session::Role,
};
use axum::{
    Router, middleware,
    response::Redirect,
    routing::{get, post},
};

/// Student Router Module
///
/// Homework, the AI tutor, learning evaluation, self practice and class
/// membership. Nested under `/student` and guarded like the other role routers.
pub fn student_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(student::home))
        // --- Homework ---
        .route("/homeworks", get(student::homeworks))
        .route("/homeworks/result/{hw_id}", get(student::homework_result))
        .route("/homeworks/{hw_id}", get(student::homework_detail))
        .route("/homeworks/{hw_id}/submit", post(student::submit_homework))
        // --- AI Tutor ---
        .route("/ai", get(student::ai_sessions))
        .route("/ai/new", post(student::new_ai_session))
        .route("/ai/{session_id}", get(student::ai_session).post(student::ask))
        .route("/ai/{session_id}/delete", post(student::delete_ai_session))
        // --- Evaluation & Practice ---
        .route("/evaluate", get(student::evaluate))
        .route("/self_practice", get(student::practices).post(student::generate_practice))
        .route("/self_practice/{id}", get(student::practice_detail))
        .route("/self_practice/{id}/submit", post(student::submit_practice))
        .route("/self_practice/{id}/pdf", get(student::practice_pdf))
        // --- Classes ---
        .route("/classes", get(student::classes).post(student::join_class))
        .route("/classes/{cid}", get(student::class_info))
        .route("/classes/{cid}/leave", post(student::leave_class))
        // Unknown sub-paths land on the homework list.
        .fallback(|| async { Redirect::to(Role::Student.default_page()) })
        // A known path requested with the wrong method goes the same way.
        .method_not_allowed_fallback(|| async { Redirect::to(Role::Student.default_page()) })
        .layer(middleware::from_fn_with_state(STUDENT_ROLES, guard::require_roles))
}
