use crate::auth::Teacher;
use crate::error::ApiError;
use crate::services::parse_uuid;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::material::Material;

pub async fn process(
    state: web::Data<AppState>,
    teacher: Teacher,
    material_id: web::Path<String>,
) -> impl Responder {
    match get_material(&state, &teacher, &material_id) {
        Ok(material) => HttpResponse::Ok().json(material),
        Err(e) => e.error_response(),
    }
}

fn get_material(state: &AppState, teacher: &Teacher, material_id: &str) -> Result<Material, ApiError> {
    let material_id = parse_uuid(material_id, "material")?;
    let conn = state.db()?;
    super::load_owned(&conn, &teacher.id, &material_id)
}
