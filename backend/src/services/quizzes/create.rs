use crate::auth::Teacher;
use crate::error::ApiError;
use crate::services::{materials, parse_uuid};
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::quiz::{QuestionType, Quiz};
use common::requests::CreateQuizRequest;
use log::info;

/// `POST /api/v1/quizzes`. Answers `201 Created` with the stored quiz.
pub async fn process(
    state: web::Data<AppState>,
    teacher: Teacher,
    payload: web::Json<CreateQuizRequest>,
) -> impl Responder {
    match create_quiz(&state, &teacher, payload.into_inner()) {
        Ok(quiz) => HttpResponse::Created().json(quiz),
        Err(e) => e.error_response(),
    }
}

fn create_quiz(
    state: &AppState,
    teacher: &Teacher,
    payload: CreateQuizRequest,
) -> Result<Quiz, ApiError> {
    let material_id = parse_uuid(&payload.material_id, "material")?;
    let conn = state.db()?;
    let material = materials::load_owned(&conn, &teacher.id, &material_id)?;

    let questions = super::ingest::normalize(&payload.questions, QuestionType::Mcq);
    if questions.is_empty() {
        return Err(ApiError::Unprocessable(
            "Quiz must contain at least one valid question".to_string(),
        ));
    }

    let title = payload
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| super::default_title(&material.title));

    let quiz = super::insert(&conn, &material.id, &title, questions)?;
    info!(
        "teacher {} created quiz {} with {} questions",
        teacher.id,
        quiz.id,
        quiz.questions.len()
    );
    Ok(quiz)
}
