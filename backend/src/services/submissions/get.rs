use crate::auth::Teacher;
use crate::error::ApiError;
use crate::services::parse_uuid;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::submission::SubmissionDetail;

pub async fn process(
    state: web::Data<AppState>,
    teacher: Teacher,
    submission_id: web::Path<String>,
) -> impl Responder {
    match get_submission(&state, &teacher, &submission_id) {
        Ok(detail) => HttpResponse::Ok().json(detail),
        Err(e) => e.error_response(),
    }
}

fn get_submission(
    state: &AppState,
    teacher: &Teacher,
    submission_id: &str,
) -> Result<SubmissionDetail, ApiError> {
    let submission_id = parse_uuid(submission_id, "submission")?;
    let conn = state.db()?;
    super::load_owned(&conn, &teacher.id, &submission_id)
}
