//! `POST /api/v1/ai/generate-quiz`.
//!
//! The detailed prompt (explanations, topic tags) is tried first under the
//! configured timeout. If it fails, times out or yields nothing usable, the
//! plain prompt gets one more try. Only the outcome of that second attempt
//! decides the error: a timeout is 504, anything else is 503.

use crate::assistant::{AssistantError, QuizPrompt};
use crate::auth::Teacher;
use crate::error::ApiError;
use crate::services::{materials, parse_uuid};
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::quiz::{Question, QuestionType, Quiz};
use common::requests::GenerateQuizRequest;
use log::{info, warn};
use std::time::Duration;

const MAX_QUESTIONS: u32 = 50;

pub async fn process(
    state: web::Data<AppState>,
    teacher: Teacher,
    payload: web::Json<GenerateQuizRequest>,
) -> impl Responder {
    match generate_quiz(&state, &teacher, payload.into_inner()).await {
        Ok(quiz) => HttpResponse::Created().json(quiz),
        Err(e) => e.error_response(),
    }
}

async fn generate_quiz(
    state: &AppState,
    teacher: &Teacher,
    payload: GenerateQuizRequest,
) -> Result<Quiz, ApiError> {
    if payload.count == 0 || payload.count > MAX_QUESTIONS {
        return Err(ApiError::Unprocessable(format!(
            "count must be between 1 and {}",
            MAX_QUESTIONS
        )));
    }
    let material_id = parse_uuid(&payload.material_id, "material")?;
    let material = {
        let conn = state.db()?;
        materials::load_owned(&conn, &teacher.id, &material_id)?
    };
    let content = material
        .content
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Material has no extracted text".to_string()))?;

    if !state.assistant.is_enabled() {
        return Err(ApiError::ServiceUnavailable(
            "Quiz generation is not configured".to_string(),
        ));
    }

    let prompt = QuizPrompt {
        text: content,
        count: payload.count,
        difficulty: payload.difficulty.as_str(),
        question_type: payload.question_type.as_str(),
    };
    let timeout = Duration::from_secs(state.config.quiz_timeout_secs);

    let mut questions = match attempt(state, &prompt, true, timeout, payload.question_type).await {
        Ok(questions) => questions,
        Err(e) => {
            warn!("detailed quiz generation failed ({}), retrying with the basic prompt", e);
            attempt(state, &prompt, false, timeout, payload.question_type)
                .await
                .map_err(|e| match e {
                    AssistantError::Timeout => {
                        ApiError::GatewayTimeout("Quiz generation timed out".to_string())
                    }
                    other => ApiError::ServiceUnavailable(format!(
                        "Quiz generation failed: {}",
                        other
                    )),
                })?
        }
    };
    questions.truncate(payload.count as usize);

    let title = payload
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| super::default_title(&material.title));

    let conn = state.db()?;
    let quiz = super::insert(&conn, &material.id, &title, questions)?;
    info!(
        "generated quiz {} ({} {} questions) for material {}",
        quiz.id,
        quiz.questions.len(),
        payload.difficulty.as_str(),
        material.id
    );
    Ok(quiz)
}

async fn attempt(
    state: &AppState,
    prompt: &QuizPrompt<'_>,
    detailed: bool,
    timeout: Duration,
    question_type: QuestionType,
) -> Result<Vec<Question>, AssistantError> {
    let raw = tokio::time::timeout(timeout, state.assistant.generate_quiz(prompt, detailed))
        .await
        .map_err(|_| AssistantError::Timeout)??;
    let questions = super::ingest::normalize(&raw, question_type);
    if questions.is_empty() {
        return Err(AssistantError::Malformed(
            "no usable questions in the reply".to_string(),
        ));
    }
    Ok(questions)
}
