use super::links::{self, PublicLink};
use crate::error::ApiError;
use crate::services::{materials, quizzes, submissions};
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use chrono::Utc;
use common::model::quiz::PublicQuestion;
use common::model::share::{
    ResourceType, SharedMaterial, SharedQuiz, SharedResource, SharedSubmission,
};
use common::requests::PasswordQuery;
use rusqlite::Connection;

pub async fn process(
    state: web::Data<AppState>,
    code: web::Path<String>,
    query: web::Query<PasswordQuery>,
) -> impl Responder {
    match resolve_shared(&state, &code, query.password.as_deref()) {
        Ok(resource) => HttpResponse::Ok().json(resource),
        Err(e) => e.error_response(),
    }
}

fn resolve_shared(
    state: &AppState,
    code: &str,
    password: Option<&str>,
) -> Result<SharedResource, ApiError> {
    let conn = state.db()?;
    let link = links::resolve(&conn, code, password, Utc::now())?;
    match link.resource_type {
        ResourceType::Quiz => shared_quiz(&conn, &link).map(SharedResource::Quiz),
        ResourceType::Material => shared_material(&conn, &link).map(SharedResource::Material),
        ResourceType::OcrResult => shared_submission(&conn, &link).map(SharedResource::OcrResult),
    }
}

fn shared_quiz(conn: &Connection, link: &PublicLink) -> Result<SharedQuiz, ApiError> {
    let quiz = quizzes::load(conn, &link.resource_id)?
        .ok_or_else(|| ApiError::NotFound("Quiz not found".to_string()))?;
    Ok(SharedQuiz {
        short_code: link.short_code.clone(),
        view_only: link.view_only,
        allow_copy: link.allow_copy,
        title: quiz.title,
        quiz_id: quiz.id,
        questions: quiz.questions.iter().map(PublicQuestion::from).collect(),
    })
}

fn shared_material(conn: &Connection, link: &PublicLink) -> Result<SharedMaterial, ApiError> {
    let material = materials::load(conn, &link.resource_id)?
        .ok_or_else(|| ApiError::NotFound("Material not found".to_string()))?;
    Ok(SharedMaterial {
        short_code: link.short_code.clone(),
        view_only: link.view_only,
        allow_copy: link.allow_copy,
        title: material.title,
        material_id: material.id,
        content: material.content.filter(|_| link.allow_copy),
        accept_uploads: true,
    })
}

fn shared_submission(conn: &Connection, link: &PublicLink) -> Result<SharedSubmission, ApiError> {
    let detail = submissions::find_owned(conn, &link.owner_id, &link.resource_id)?
        .ok_or_else(|| ApiError::NotFound("Submission not found".to_string()))?;
    Ok(SharedSubmission {
        short_code: link.short_code.clone(),
        view_only: link.view_only,
        allow_copy: link.allow_copy,
        submission_id: detail.id,
        student_name: detail.student.name,
        status: detail.status,
        score: detail.manual_score.or(detail.student.accuracy),
        questions: detail.questions,
    })
}
