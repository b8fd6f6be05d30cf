use crate::auth::Teacher;
use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::teacher::TeacherProfile;
use rusqlite::params;

pub async fn process(state: web::Data<AppState>, teacher: Teacher) -> impl Responder {
    match profile(&state, &teacher) {
        Ok(profile) => HttpResponse::Ok().json(profile),
        Err(e) => e.error_response(),
    }
}

fn profile(state: &AppState, teacher: &Teacher) -> Result<TeacherProfile, ApiError> {
    let conn = state.db()?;
    let display_name = conn.query_row(
        "SELECT display_name FROM teachers WHERE id = ?1",
        params![teacher.id],
        |row| row.get::<_, Option<String>>(0),
    )?;
    Ok(TeacherProfile {
        id: teacher.id.clone(),
        email: teacher.email.clone(),
        display_name,
    })
}
