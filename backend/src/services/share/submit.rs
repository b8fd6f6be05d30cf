//! `POST /api/v1/share/{code}/submit`: anonymous quiz answers.
//!
//! Every call appends a new student result; resubmitting is allowed and
//! simply records another attempt.

use super::{grade, links, truncate_name};
use crate::error::ApiError;
use crate::services::{new_id, quizzes};
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use chrono::Utc;
use common::model::quiz::QuizGradeResponse;
use common::model::share::ResourceType;
use common::requests::{PasswordQuery, QuizSubmission};
use log::info;
use rusqlite::params;

const DEFAULT_STUDENT_NAME: &str = "Student";

pub async fn process(
    state: web::Data<AppState>,
    code: web::Path<String>,
    query: web::Query<PasswordQuery>,
    payload: web::Json<QuizSubmission>,
) -> impl Responder {
    let mut submission = payload.into_inner();
    if submission.password.is_none() {
        submission.password = query.into_inner().password;
    }
    match submit_answers(&state, &code, submission) {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => e.error_response(),
    }
}

fn submit_answers(
    state: &AppState,
    code: &str,
    submission: QuizSubmission,
) -> Result<QuizGradeResponse, ApiError> {
    let conn = state.db()?;
    let link = links::resolve(&conn, code, submission.password.as_deref(), Utc::now())?;
    if link.resource_type != ResourceType::Quiz {
        return Err(ApiError::BadRequest(
            "This link does not accept quiz answers".to_string(),
        ));
    }
    let quiz = quizzes::load(&conn, &link.resource_id)?
        .ok_or_else(|| ApiError::NotFound("Quiz not found".to_string()))?;

    let grade = grade::grade(&quiz.questions, &submission.answers)?;

    let student_name = submission
        .student_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(truncate_name)
        .unwrap_or_else(|| DEFAULT_STUDENT_NAME.to_string());
    let weak_topics = serde_json::to_string(&grade.weak_topics)
        .map_err(|e| ApiError::Internal(format!("could not serialise weak topics: {}", e)))?;

    conn.execute(
        "INSERT INTO student_results(id, owner_id, student_identifier, quiz_id, score, weak_topics, submission_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            new_id(),
            link.owner_id,
            student_name,
            quiz.id,
            grade.score,
            weak_topics,
            Utc::now()
        ],
    )?;
    info!(
        "quiz {} answered via {}: {}/{} correct",
        quiz.id, link.short_code, grade.correct, grade.total
    );

    Ok(QuizGradeResponse {
        quiz_id: quiz.id,
        student_name,
        score: grade.score,
        correct: grade.correct,
        total: grade.total,
        details: grade.details,
    })
}
