use crate::auth::Teacher;
use crate::error::ApiError;
use crate::services::{courses, parse_uuid, student_key};
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use chrono::Utc;
use common::model::analytics::TeacherComment;
use common::requests::CommentRequest;
use rusqlite::params;

/// Upserts the comment for one student of a course. An empty comment clears it.
pub async fn process(
    state: web::Data<AppState>,
    teacher: Teacher,
    payload: web::Json<CommentRequest>,
) -> impl Responder {
    match save_comment(&state, &teacher, payload.into_inner()) {
        Ok(comment) => HttpResponse::Ok().json(comment),
        Err(e) => e.error_response(),
    }
}

fn save_comment(
    state: &AppState,
    teacher: &Teacher,
    payload: CommentRequest,
) -> Result<TeacherComment, ApiError> {
    let key = student_key(&payload.student_name);
    if key.is_empty() {
        return Err(ApiError::BadRequest("studentName is required".to_string()));
    }
    let course_id = parse_uuid(&payload.course_id, "course")?;
    let conn = state.db()?;
    courses::ensure_owned(&conn, &teacher.id, &course_id)?;

    let comment = payload.comment.trim().to_string();
    let updated_at = Utc::now();
    if comment.is_empty() {
        conn.execute(
            "DELETE FROM teacher_comments WHERE owner_id = ?1 AND course_id = ?2 AND student_key = ?3",
            params![teacher.id, course_id, key],
        )?;
    } else {
        conn.execute(
            "INSERT INTO teacher_comments(owner_id, course_id, student_key, comment, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(owner_id, course_id, student_key)
             DO UPDATE SET comment = excluded.comment, updated_at = excluded.updated_at",
            params![teacher.id, course_id, key, comment, updated_at],
        )?;
    }

    Ok(TeacherComment {
        course_id,
        student_key: key,
        comment,
        updated_at,
    })
}
