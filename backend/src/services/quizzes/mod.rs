//! Quiz authoring: manual creation, editing and assistant generation.
//!
//! Questions are stored as a JSON array on the quiz row. Ownership follows
//! the quiz's material.

mod create;
mod generate;
mod get;
pub mod ingest;
mod update;

use crate::error::ApiError;
use crate::services::new_id;
use actix_web::web::{get, patch, post, scope};
use actix_web::Scope;
use chrono::Utc;
use common::model::quiz::{Question, Quiz};
use rusqlite::{params, Connection, OptionalExtension, Row};

const API_PATH: &str = "/api/v1/quizzes";
const AI_API_PATH: &str = "/api/v1/ai";

/// *   **`POST /`**: create a quiz from hand-written questions.
/// *   **`GET /{quiz_id}`**: full quiz, answer keys included.
/// *   **`PATCH /{quiz_id}`**: replace the title and/or the question list.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", post().to(create::process))
        .route("/{quiz_id}", get().to(get::process))
        .route("/{quiz_id}", patch().to(update::process))
}

/// *   **`POST /generate-quiz`**: ask the assistant for questions about a material.
pub fn configure_ai_routes() -> Scope {
    scope(AI_API_PATH).route("/generate-quiz", post().to(generate::process))
}

fn quiz_from_row(row: &Row<'_>) -> rusqlite::Result<Quiz> {
    let questions: String = row.get(3)?;
    let questions: Vec<Question> = serde_json::from_str(&questions).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Quiz {
        id: row.get(0)?,
        material_id: row.get(1)?,
        title: row.get(2)?,
        questions,
        created_at: row.get(4)?,
    })
}

pub(crate) fn load(conn: &Connection, quiz_id: &str) -> Result<Option<Quiz>, ApiError> {
    Ok(conn
        .query_row(
            "SELECT id, material_id, title, questions, created_at FROM quizzes WHERE id = ?1",
            params![quiz_id],
            quiz_from_row,
        )
        .optional()?)
}

/// The quiz if its material belongs to `owner_id`, NotFound otherwise.
pub(crate) fn load_owned(conn: &Connection, owner_id: &str, quiz_id: &str) -> Result<Quiz, ApiError> {
    conn.query_row(
        "SELECT q.id, q.material_id, q.title, q.questions, q.created_at
         FROM quizzes q JOIN materials m ON m.id = q.material_id
         WHERE q.id = ?1 AND m.owner_id = ?2",
        params![quiz_id, owner_id],
        quiz_from_row,
    )
    .optional()?
    .ok_or_else(|| ApiError::NotFound("Quiz not found".to_string()))
}

fn questions_json(questions: &[Question]) -> Result<String, ApiError> {
    serde_json::to_string(questions)
        .map_err(|e| ApiError::Internal(format!("could not serialise questions: {}", e)))
}

pub(crate) fn insert(
    conn: &Connection,
    material_id: &str,
    title: &str,
    questions: Vec<Question>,
) -> Result<Quiz, ApiError> {
    let quiz = Quiz {
        id: new_id(),
        material_id: material_id.to_string(),
        title: title.to_string(),
        questions,
        created_at: Utc::now(),
    };
    conn.execute(
        "INSERT INTO quizzes(id, material_id, title, questions, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            quiz.id,
            quiz.material_id,
            quiz.title,
            questions_json(&quiz.questions)?,
            quiz.created_at
        ],
    )?;
    Ok(quiz)
}

fn default_title(material_title: &str) -> String {
    format!("Quiz: {}", material_title)
}
