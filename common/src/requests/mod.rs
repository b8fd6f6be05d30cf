//! JSON request bodies.
//!
//! Legacy snake_case spellings that older clients still send (`material_id`,
//! `correct_answer`, `question`) are folded in here through serde aliases, so
//! handlers only ever see one canonical shape.

use crate::model::quiz::{Difficulty, QuestionType};
use crate::model::share::ResourceType;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of `POST /share/create`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareConfig {
    #[serde(alias = "resource_id")]
    pub resource_id: String,
    #[serde(alias = "resource_type")]
    pub resource_type: ResourceType,
    #[serde(default, alias = "view_only")]
    pub view_only: Option<bool>,
    #[serde(default, alias = "allow_copy")]
    pub allow_copy: Option<bool>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default, alias = "expires_at")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Body of `POST /share/{code}/submit`. Answer values may be strings,
/// numbers or booleans; they are compared as text.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSubmission {
    #[serde(default, alias = "student_name")]
    pub student_name: Option<String>,
    #[serde(default)]
    pub answers: HashMap<String, Value>,
    #[serde(default)]
    pub password: Option<String>,
}

/// A question as sent by a client or returned by the assistant, before
/// normalization. Every field is optional; ingestion decides what survives.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawQuestion {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, rename = "type")]
    pub question_type: Option<String>,
    #[serde(default, alias = "question")]
    pub text: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<Value>>,
    #[serde(default, rename = "correctAnswer", alias = "correct_answer")]
    pub correct_answer: Option<Value>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuizRequest {
    #[serde(alias = "material_id")]
    pub material_id: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Kept untyped so a single malformed entry is dropped instead of
    /// rejecting the whole body.
    pub questions: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuizRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub questions: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuizRequest {
    #[serde(alias = "material_id")]
    pub material_id: String,
    pub difficulty: Difficulty,
    pub count: u32,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualCorrection {
    #[serde(default)]
    pub manual_score: Option<i64>,
    /// Region id to corrected text.
    #[serde(default)]
    pub corrected_text: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
pub struct BatchApproveRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    #[serde(alias = "course_id")]
    pub course_id: String,
    #[serde(alias = "student_name")]
    pub student_name: String,
    #[serde(default)]
    pub comment: String,
}

/// Query string carrying the course scope of analytics and dashboards.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseQuery {
    #[serde(default)]
    pub course_id: Option<String>,
}

/// Query string of public share routes.
#[derive(Debug, Default, Deserialize)]
pub struct PasswordQuery {
    #[serde(default)]
    pub password: Option<String>,
}
