use bytes::Bytes;
use serde_json::{Value, json};

use super::{ApiCall, ApiError, EduApi, resource_path};
use crate::models::{
    ClassDetail, ClassInfo, CoursewarePreview, CoursewareSummary, ExerciseDraft, ExerciseRequest,
    ExerciseSummary, HomeworkResult, LessonMarkdown, StudentMeta, SubmissionMeta,
};

// --- Lesson Preparation ---

pub async fn prepare_lesson(api: &dyn EduApi, token: &str, topic: &str) -> Result<String, ApiError> {
    let reply = api
        .send(
            ApiCall::post("/teacher/lesson/prepare")
                .bearer(token)
                .json(json!({ "topic": topic, "export_pdf": false })),
        )
        .await?;
    Ok(reply.json::<LessonMarkdown>()?.markdown)
}

/// Same generation as `prepare_lesson`, returned as an opaque PDF payload.
pub async fn lesson_pdf(api: &dyn EduApi, token: &str, topic: &str) -> Result<Bytes, ApiError> {
    let reply = api
        .send(
            ApiCall::post("/teacher/lesson/prepare")
                .bearer(token)
                .json(json!({ "topic": topic, "export_pdf": true })),
        )
        .await?;
    Ok(reply.bytes)
}

pub async fn list_lessons(api: &dyn EduApi, token: &str) -> Result<Vec<CoursewareSummary>, ApiError> {
    api.send(ApiCall::get("/teacher/lesson/list").bearer(token))
        .await?
        .json()
}

pub async fn lesson_preview(api: &dyn EduApi, token: &str, cw_id: &str) -> Result<CoursewarePreview, ApiError> {
    api.send(ApiCall::get(resource_path("/teacher/lesson/preview/{}", &[cw_id])?).bearer(token))
        .await?
        .json()
}

pub async fn courseware_pdf(api: &dyn EduApi, token: &str, cw_id: &str) -> Result<Bytes, ApiError> {
    Ok(api
        .send(ApiCall::get(resource_path("/teacher/lesson/{}/download", &[cw_id])?).bearer(token))
        .await?
        .bytes)
}

// --- Exercises ---

pub async fn generate_exercise(
    api: &dyn EduApi,
    token: &str,
    request: &ExerciseRequest,
) -> Result<ExerciseDraft, ApiError> {
    let mut body = serde_json::to_value(request).map_err(|e| ApiError::Decode(e.to_string()))?;
    body["export_pdf"] = Value::Bool(false);

    let mut draft: ExerciseDraft = api
        .send(ApiCall::post("/teacher/exercise/generate").bearer(token).json(body))
        .await?
        .json()?;
    if draft.topic.is_empty() {
        draft.topic = request.topic.clone();
    }
    Ok(draft)
}

/// save_exercise
///
/// Stores a previously generated draft so it can be assigned later.
pub async fn save_exercise(api: &dyn EduApi, token: &str, draft: &ExerciseDraft) -> Result<ExerciseSummary, ApiError> {
    api.send(ApiCall::post("/teacher/exercise/save").bearer(token).json(json!({
        "topic": draft.topic,
        "questions": draft.questions,
        "answers": draft.answers,
    })))
    .await?
    .json()
}

pub async fn list_exercises(api: &dyn EduApi, token: &str) -> Result<Vec<ExerciseSummary>, ApiError> {
    api.send(ApiCall::get("/teacher/exercise/list").bearer(token))
        .await?
        .json()
}

pub async fn exercise_preview(api: &dyn EduApi, token: &str, ex_id: &str) -> Result<ExerciseSummary, ApiError> {
    api.send(ApiCall::get(resource_path("/teacher/exercise/preview/{}", &[ex_id])?).bearer(token))
        .await?
        .json()
}

pub async fn assign_exercise(api: &dyn EduApi, token: &str, ex_id: &str) -> Result<(), ApiError> {
    api.send(ApiCall::post(resource_path("/teacher/exercise/{}/assign", &[ex_id])?).bearer(token))
        .await?;
    Ok(())
}

/// Statistics come back in whatever shape the grading service produces.
pub async fn exercise_stats(api: &dyn EduApi, token: &str, ex_id: &str) -> Result<Value, ApiError> {
    api.send(ApiCall::get(resource_path("/teacher/exercise/{}/stats", &[ex_id])?).bearer(token))
        .await?
        .json()
}

/// `kind` is `questions` or `answers`.
pub async fn exercise_pdf(api: &dyn EduApi, token: &str, ex_id: &str, kind: &str) -> Result<Bytes, ApiError> {
    Ok(api
        .send(ApiCall::get(resource_path("/teacher/exercise/{}/download/{}", &[ex_id, kind])?).bearer(token))
        .await?
        .bytes)
}

// --- Classes ---

pub async fn list_classes(api: &dyn EduApi, token: &str) -> Result<Vec<ClassInfo>, ApiError> {
    api.send(ApiCall::get("/classes/teacher").bearer(token)).await?.json()
}

pub async fn create_class(api: &dyn EduApi, token: &str, name: &str, subject: &str) -> Result<ClassInfo, ApiError> {
    api.send(
        ApiCall::post("/classes/teacher")
            .bearer(token)
            .json(json!({ "name": name, "subject": subject })),
    )
    .await?
    .json()
}

pub async fn class_detail(api: &dyn EduApi, token: &str, cid: &str) -> Result<ClassDetail, ApiError> {
    api.send(ApiCall::get(resource_path("/classes/teacher/{}", &[cid])?).bearer(token))
        .await?
        .json()
}

pub async fn delete_class(api: &dyn EduApi, token: &str, cid: &str) -> Result<(), ApiError> {
    api.send(ApiCall::delete(resource_path("/classes/teacher/{}", &[cid])?).bearer(token))
        .await?;
    Ok(())
}

pub async fn remove_student(api: &dyn EduApi, token: &str, cid: &str, sid: &str) -> Result<(), ApiError> {
    api.send(ApiCall::delete(resource_path("/classes/teacher/{}/student/{}", &[cid, sid])?).bearer(token))
        .await?;
    Ok(())
}

// --- Student Insight ---

pub async fn list_students(api: &dyn EduApi, token: &str) -> Result<Vec<StudentMeta>, ApiError> {
    api.send(ApiCall::get("/teacher/students").bearer(token)).await?.json()
}

pub async fn student_analysis(api: &dyn EduApi, token: &str, sid: &str) -> Result<Value, ApiError> {
    api.send(ApiCall::get(resource_path("/teacher/students/{}/analysis", &[sid])?).bearer(token))
        .await?
        .json()
}

pub async fn student_homeworks(api: &dyn EduApi, token: &str, sid: &str) -> Result<Vec<SubmissionMeta>, ApiError> {
    api.send(ApiCall::get(resource_path("/teacher/students/{}/homeworks", &[sid])?).bearer(token))
        .await?
        .json()
}

pub async fn student_homework_detail(
    api: &dyn EduApi,
    token: &str,
    sid: &str,
    hw_id: &str,
) -> Result<HomeworkResult, ApiError> {
    api.send(ApiCall::get(resource_path("/teacher/students/{}/homework/{}", &[sid, hw_id])?).bearer(token))
        .await?
        .json()
}
