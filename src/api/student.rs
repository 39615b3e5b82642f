use bytes::Bytes;
use serde_json::{Map, Value, json};

use super::{ApiCall, ApiError, EduApi, resource_path};
use crate::models::{
    ChatMessage, ChatSession, ClassInfo, HomeworkEntry, HomeworkQuestions, HomeworkResult, Practice,
};

// --- Homework ---

pub async fn list_homeworks(api: &dyn EduApi, token: &str) -> Result<Vec<HomeworkEntry>, ApiError> {
    api.send(ApiCall::get("/student/homeworks").bearer(token)).await?.json()
}

pub async fn homework_questions(api: &dyn EduApi, token: &str, hw_id: &str) -> Result<HomeworkQuestions, ApiError> {
    api.send(ApiCall::get(resource_path("/student/homeworks/{}/exercise", &[hw_id])?).bearer(token))
        .await?
        .json()
}

/// Submits answers. Grading happens asynchronously on the server.
pub async fn submit_homework(
    api: &dyn EduApi,
    token: &str,
    hw_id: &str,
    answers: Map<String, Value>,
) -> Result<(), ApiError> {
    api.send(
        ApiCall::post(resource_path("/student/homeworks/{}/submit", &[hw_id])?)
            .bearer(token)
            .json(json!({ "answers": answers })),
    )
    .await?;
    Ok(())
}

pub async fn homework_result(api: &dyn EduApi, token: &str, hw_id: &str) -> Result<HomeworkResult, ApiError> {
    api.send(ApiCall::get(resource_path("/student/homeworks/{}/result", &[hw_id])?).bearer(token))
        .await?
        .json()
}

// --- AI Tutor Sessions ---

pub async fn list_chat_sessions(api: &dyn EduApi, token: &str) -> Result<Vec<ChatSession>, ApiError> {
    api.send(ApiCall::get("/student/ai/sessions").bearer(token)).await?.json()
}

pub async fn create_chat_session(api: &dyn EduApi, token: &str) -> Result<ChatSession, ApiError> {
    api.send(ApiCall::post("/student/ai/session").bearer(token)).await?.json()
}

pub async fn chat_messages(api: &dyn EduApi, token: &str, session_id: &str) -> Result<Vec<ChatMessage>, ApiError> {
    api.send(ApiCall::get(resource_path("/student/ai/session/{}", &[session_id])?).bearer(token))
        .await?
        .json()
}

pub async fn ask(api: &dyn EduApi, token: &str, session_id: &str, question: &str) -> Result<ChatMessage, ApiError> {
    api.send(
        ApiCall::post(resource_path("/student/ai/session/{}/ask", &[session_id])?)
            .bearer(token)
            .json(json!({ "question": question })),
    )
    .await?
    .json()
}

pub async fn delete_chat_session(api: &dyn EduApi, token: &str, session_id: &str) -> Result<(), ApiError> {
    api.send(ApiCall::delete(resource_path("/student/ai/session/{}", &[session_id])?).bearer(token))
        .await?;
    Ok(())
}

/// Latest learning analysis. The server answers `{"analysis": ""}` when none exists.
pub async fn analysis(api: &dyn EduApi, token: &str) -> Result<Value, ApiError> {
    api.send(ApiCall::get("/student/analysis").bearer(token)).await?.json()
}

// --- Self Practice ---

pub async fn list_practices(api: &dyn EduApi, token: &str) -> Result<Vec<Practice>, ApiError> {
    api.send(ApiCall::get("/student/self_practice/list").bearer(token))
        .await?
        .json()
}

pub async fn generate_practice(api: &dyn EduApi, token: &str, topic: &str) -> Result<Practice, ApiError> {
    api.send(
        ApiCall::post("/student/self_practice/generate")
            .bearer(token)
            .json(json!({ "topic": topic })),
    )
    .await?
    .json()
}

pub async fn practice(api: &dyn EduApi, token: &str, id: &str) -> Result<Practice, ApiError> {
    api.send(ApiCall::get(resource_path("/student/self_practice/{}", &[id])?).bearer(token))
        .await?
        .json()
}

pub async fn submit_practice(
    api: &dyn EduApi,
    token: &str,
    id: &str,
    answers: Map<String, Value>,
) -> Result<Practice, ApiError> {
    api.send(
        ApiCall::post(resource_path("/student/self_practice/{}/submit", &[id])?)
            .bearer(token)
            .json(json!({ "answers": answers })),
    )
    .await?
    .json()
}

pub async fn practice_pdf(api: &dyn EduApi, token: &str, id: &str) -> Result<Bytes, ApiError> {
    Ok(api
        .send(ApiCall::get(resource_path("/student/self_practice/{}/download", &[id])?).bearer(token))
        .await?
        .bytes)
}

// --- Classes ---

pub async fn my_classes(api: &dyn EduApi, token: &str) -> Result<Vec<ClassInfo>, ApiError> {
    api.send(ApiCall::get("/classes/student").bearer(token)).await?.json()
}

pub async fn join_class(api: &dyn EduApi, token: &str, class_id: i64) -> Result<(), ApiError> {
    api.send(
        ApiCall::post("/classes/student/join")
            .bearer(token)
            .json(json!({ "class_id": class_id })),
    )
    .await?;
    Ok(())
}

pub async fn class_info(api: &dyn EduApi, token: &str, cid: &str) -> Result<ClassInfo, ApiError> {
    api.send(ApiCall::get(resource_path("/classes/student/{}", &[cid])?).bearer(token))
        .await?
        .json()
}

pub async fn leave_class(api: &dyn EduApi, token: &str, cid: &str) -> Result<(), ApiError> {
    api.send(ApiCall::delete(resource_path("/classes/student/{}", &[cid])?).bearer(token))
        .await?;
    Ok(())
}
