use crate::auth::Teacher;
use crate::error::ApiError;
use crate::services::parse_uuid;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::material::Material;
use common::requests::CourseQuery;
use rusqlite::params;

/// Newest first. `?courseId=` narrows the list to one course.
pub async fn process(
    state: web::Data<AppState>,
    teacher: Teacher,
    query: web::Query<CourseQuery>,
) -> impl Responder {
    match list_materials(&state, &teacher, query.course_id.as_deref()) {
        Ok(materials) => HttpResponse::Ok().json(materials),
        Err(e) => e.error_response(),
    }
}

fn list_materials(
    state: &AppState,
    teacher: &Teacher,
    course_id: Option<&str>,
) -> Result<Vec<Material>, ApiError> {
    let course_id = course_id.map(|id| parse_uuid(id, "course")).transpose()?;
    let conn = state.db()?;
    let sql = format!(
        "SELECT {} FROM materials
         WHERE owner_id = ?1 AND (?2 IS NULL OR course_id = ?2)
         ORDER BY created_at DESC",
        super::MATERIAL_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let materials = stmt
        .query_map(params![teacher.id, course_id], super::material_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(materials)
}
