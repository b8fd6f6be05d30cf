use crate::auth::Teacher;
use crate::error::ApiError;
use crate::services::parse_uuid;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::quiz::Quiz;

pub async fn process(
    state: web::Data<AppState>,
    teacher: Teacher,
    quiz_id: web::Path<String>,
) -> impl Responder {
    match get_quiz(&state, &teacher, &quiz_id) {
        Ok(quiz) => HttpResponse::Ok().json(quiz),
        Err(e) => e.error_response(),
    }
}

fn get_quiz(state: &AppState, teacher: &Teacher, quiz_id: &str) -> Result<Quiz, ApiError> {
    let quiz_id = parse_uuid(quiz_id, "quiz")?;
    let conn = state.db()?;
    super::load_owned(&conn, &teacher.id, &quiz_id)
}
