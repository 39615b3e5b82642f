use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::session::Role;

// --- Authentication Payloads ---

/// LoginResponse
///
/// Body returned by the remote `POST /auth/token` exchange. Some deployments
/// omit `role`; the auth wrapper then resolves it from the profile endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub role: Option<String>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Credentials submitted from the login form.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// RegisterRequest
///
/// Payload forwarded to `POST /auth/register`. The password is passed through
/// and never logged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
}

/// Profile
///
/// Identity returned by `/auth/me` and `/auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub id: i64,
    pub username: String,
    pub role: String,
}

// --- Exercises & Questions ---

/// QuestionBlock
///
/// A group of generated questions of one kind (choice, fill-in, short answer,
/// programming). Items stay loosely typed apart from the fields the portal renders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct QuestionBlock {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub items: Vec<QuestionItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct QuestionItem {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

impl QuestionItem {
    /// Key under which the answer to this item is submitted.
    pub fn answer_key(&self) -> String {
        match &self.id {
            Value::String(s) => s.clone(),
            Value::Null => self.question.clone(),
            other => other.to_string(),
        }
    }
}

/// Generation parameters from the exercise form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExerciseRequest {
    pub topic: String,
    #[serde(default)]
    pub num_mcq: u32,
    #[serde(default)]
    pub num_fill_blank: u32,
    #[serde(default)]
    pub num_short_answer: u32,
    #[serde(default)]
    pub num_programming: u32,
}

/// ExerciseDraft
///
/// A generated but unsaved exercise. The teacher can save it afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ExerciseDraft {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub questions: Vec<QuestionBlock>,
    #[serde(default)]
    pub answers: Value,
}

/// ExerciseSummary
///
/// A saved exercise as listed and previewed by its owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ExerciseSummary {
    pub id: i64,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub prompt: Vec<QuestionBlock>,
    #[serde(default)]
    pub answers: Value,
    #[serde(default)]
    pub created_at: Option<String>,
}

// --- Coursewares ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CoursewareSummary {
    pub id: i64,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub teacher_id: Option<i64>,
    #[serde(default)]
    pub is_public: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CoursewarePreview {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub markdown: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LessonMarkdown {
    pub markdown: String,
}

// --- Classes ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ClassInfo {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub student_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ClassDetail {
    #[serde(flatten)]
    pub info: ClassInfo,
    #[serde(default)]
    pub students: Vec<StudentMeta>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StudentMeta {
    pub id: i64,
    pub username: String,
}

// --- Homework & Submissions ---

/// HomeworkEntry
///
/// One row of the student's homework list. `status` is one of
/// `not_submitted`, `grading`, `completed`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct HomeworkEntry {
    pub homework_id: i64,
    #[serde(default)]
    pub exercise_id: i64,
    #[serde(default)]
    pub assigned_at: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub subject: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct HomeworkQuestions {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub prompt: Vec<QuestionBlock>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct HomeworkResult {
    #[serde(default)]
    pub exercise: Option<ExerciseSummary>,
    #[serde(default)]
    pub student_answers: Value,
    #[serde(default)]
    pub feedback: Value,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub total_score: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SubmissionMeta {
    pub homework_id: i64,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub submitted_at: Option<String>,
}

// --- AI Tutor ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ChatSession {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ChatMessage {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

// --- Self Practice ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Practice {
    pub id: i64,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub questions: Vec<QuestionBlock>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub feedback: Option<Value>,
    #[serde(default)]
    pub score: Option<i64>,
}

// --- Administration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct UserAccount {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PublicDocument {
    pub id: i64,
    pub filename: String,
    #[serde(default)]
    pub uploaded_at: Option<String>,
}
