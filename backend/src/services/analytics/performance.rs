use crate::auth::Teacher;
use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use chrono::Utc;
use common::model::analytics::AnalyticsData;
use common::requests::CourseQuery;

pub async fn process(
    state: web::Data<AppState>,
    teacher: Teacher,
    query: web::Query<CourseQuery>,
) -> impl Responder {
    match course_performance(&state, &teacher, query.course_id.as_deref()) {
        Ok(data) => HttpResponse::Ok().json(data),
        Err(e) => e.error_response(),
    }
}

fn course_performance(
    state: &AppState,
    teacher: &Teacher,
    course_id: Option<&str>,
) -> Result<AnalyticsData, ApiError> {
    let conn = state.db()?;
    let course_id = super::owned_course(&conn, teacher, course_id)?;
    let records = super::score_records(&conn, &teacher.id, &course_id)?;
    Ok(super::aggregate::aggregate(&records, Utc::now().date_naive()))
}
