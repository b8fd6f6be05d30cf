use super::MAX_TITLE_CHARS;
use crate::auth::Teacher;
use crate::error::ApiError;
use crate::services::new_id;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use chrono::Utc;
use common::model::course::Course;
use common::requests::CreateCourseRequest;
use rusqlite::params;

pub async fn process(
    state: web::Data<AppState>,
    teacher: Teacher,
    payload: web::Json<CreateCourseRequest>,
) -> impl Responder {
    match create_course(&state, &teacher, payload.into_inner()) {
        Ok(course) => HttpResponse::Created().json(course),
        Err(e) => e.error_response(),
    }
}

fn create_course(
    state: &AppState,
    teacher: &Teacher,
    payload: CreateCourseRequest,
) -> Result<Course, ApiError> {
    let title = payload.title.trim();
    if title.is_empty() || title.chars().count() > MAX_TITLE_CHARS {
        return Err(ApiError::Unprocessable(format!(
            "Title must be between 1 and {} characters",
            MAX_TITLE_CHARS
        )));
    }
    let description = payload
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    let course = Course {
        id: new_id(),
        title: title.to_string(),
        description,
        materials_count: 0,
        created_at: Utc::now(),
    };
    let conn = state.db()?;
    conn.execute(
        "INSERT INTO courses(id, owner_id, title, description, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            course.id,
            teacher.id,
            course.title,
            course.description,
            course.created_at
        ],
    )?;
    Ok(course)
}
