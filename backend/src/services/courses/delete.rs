//! `DELETE /api/v1/courses/{course_id}`.
//!
//! Materials and assignment submissions survive with `course_id` cleared;
//! teacher comments scoped to the course are removed with it. Everything
//! happens in one transaction.

use crate::auth::Teacher;
use crate::error::ApiError;
use crate::services::parse_uuid;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use log::info;
use rusqlite::params;

pub async fn process(
    state: web::Data<AppState>,
    teacher: Teacher,
    course_id: web::Path<String>,
) -> impl Responder {
    match delete_course(&state, &teacher, &course_id) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => e.error_response(),
    }
}

fn delete_course(state: &AppState, teacher: &Teacher, course_id: &str) -> Result<(), ApiError> {
    let course_id = parse_uuid(course_id, "course")?;
    let mut conn = state.db()?;
    super::ensure_owned(&conn, &teacher.id, &course_id)?;

    let tx = conn.transaction()?;
    tx.execute(
        "UPDATE materials SET course_id = NULL WHERE course_id = ?1 AND owner_id = ?2",
        params![course_id, teacher.id],
    )?;
    tx.execute(
        "UPDATE assignment_submissions SET course_id = NULL WHERE course_id = ?1 AND owner_id = ?2",
        params![course_id, teacher.id],
    )?;
    tx.execute(
        "DELETE FROM teacher_comments WHERE course_id = ?1 AND owner_id = ?2",
        params![course_id, teacher.id],
    )?;
    tx.execute(
        "DELETE FROM courses WHERE id = ?1 AND owner_id = ?2",
        params![course_id, teacher.id],
    )?;
    tx.commit()?;

    info!("teacher {} deleted course {}", teacher.id, course_id);
    Ok(())
}
