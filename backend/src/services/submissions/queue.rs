use crate::auth::Teacher;
use crate::error::ApiError;
use crate::services::parse_uuid;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::submission::{QueueItem, QueueResponse, SubmissionStatus};
use common::requests::CourseQuery;
use rusqlite::params;

pub async fn process(
    state: web::Data<AppState>,
    teacher: Teacher,
    query: web::Query<CourseQuery>,
) -> impl Responder {
    match pending_queue(&state, &teacher, query.course_id.as_deref()) {
        Ok(queue) => HttpResponse::Ok().json(queue),
        Err(e) => e.error_response(),
    }
}

fn pending_queue(
    state: &AppState,
    teacher: &Teacher,
    course_id: Option<&str>,
) -> Result<QueueResponse, ApiError> {
    let course_id = course_id.map(|id| parse_uuid(id, "course")).transpose()?;
    let conn = state.db()?;
    let mut stmt = conn.prepare(
        "SELECT id, student_name, file_name, created_at
         FROM assignment_submissions
         WHERE owner_id = ?1 AND status = ?2 AND (?3 IS NULL OR course_id = ?3)
         ORDER BY created_at DESC",
    )?;
    let queue = stmt
        .query_map(
            params![teacher.id, SubmissionStatus::Pending.as_str(), course_id],
            |row| {
                Ok(QueueItem {
                    id: row.get(0)?,
                    student_name: row.get(1)?,
                    filename: row.get(2)?,
                    status: SubmissionStatus::Pending,
                    created_at: row.get(3)?,
                })
            },
        )?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(QueueResponse {
        total: queue.len(),
        queue,
    })
}
