use crate::auth::Teacher;
use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::course::Course;
use rusqlite::params;

pub async fn process(state: web::Data<AppState>, teacher: Teacher) -> impl Responder {
    match list_courses(&state, &teacher) {
        Ok(courses) => HttpResponse::Ok().json(courses),
        Err(e) => e.error_response(),
    }
}

fn list_courses(state: &AppState, teacher: &Teacher) -> Result<Vec<Course>, ApiError> {
    let conn = state.db()?;
    let mut stmt = conn.prepare(
        "SELECT c.id, c.title, c.description, c.created_at,
                (SELECT COUNT(*) FROM materials m WHERE m.course_id = c.id)
         FROM courses c
         WHERE c.owner_id = ?1
         ORDER BY c.created_at DESC",
    )?;
    let courses = stmt
        .query_map(params![teacher.id], |row| {
            Ok(Course {
                id: row.get(0)?,
                title: row.get(1)?,
                description: row.get(2)?,
                created_at: row.get(3)?,
                materials_count: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(courses)
}
