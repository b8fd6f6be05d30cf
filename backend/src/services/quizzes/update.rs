//! `PATCH /api/v1/quizzes/{quiz_id}`: the title and the question list are
//! replaced independently. A question list that normalizes to nothing is
//! rejected with 422 and the stored quiz is left untouched.

use crate::auth::Teacher;
use crate::error::ApiError;
use crate::services::parse_uuid;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::quiz::{QuestionType, Quiz};
use common::requests::UpdateQuizRequest;
use rusqlite::params;

pub async fn process(
    state: web::Data<AppState>,
    teacher: Teacher,
    quiz_id: web::Path<String>,
    payload: web::Json<UpdateQuizRequest>,
) -> impl Responder {
    match update_quiz(&state, &teacher, &quiz_id, payload.into_inner()) {
        Ok(quiz) => HttpResponse::Ok().json(quiz),
        Err(e) => e.error_response(),
    }
}

fn update_quiz(
    state: &AppState,
    teacher: &Teacher,
    quiz_id: &str,
    payload: UpdateQuizRequest,
) -> Result<Quiz, ApiError> {
    let quiz_id = parse_uuid(quiz_id, "quiz")?;
    let conn = state.db()?;
    let mut quiz = super::load_owned(&conn, &teacher.id, &quiz_id)?;

    if let Some(title) = payload.title.as_deref().map(str::trim) {
        if title.is_empty() {
            return Err(ApiError::Unprocessable("Title cannot be empty".to_string()));
        }
        quiz.title = title.to_string();
    }

    if let Some(raw) = payload.questions {
        let questions = super::ingest::normalize(&raw, QuestionType::Mcq);
        if questions.is_empty() {
            return Err(ApiError::Unprocessable(
                "Quiz must contain at least one valid question".to_string(),
            ));
        }
        quiz.questions = questions;
    }

    conn.execute(
        "UPDATE quizzes SET title = ?1, questions = ?2 WHERE id = ?3",
        params![quiz.title, super::questions_json(&quiz.questions)?, quiz.id],
    )?;
    Ok(quiz)
}
