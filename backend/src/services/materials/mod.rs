//! Teaching materials: uploaded documents plus their extracted text.

mod get;
mod list;
mod upload;

use crate::error::ApiError;
use actix_web::web::{get, post, scope};
use actix_web::Scope;
use common::model::material::{Material, MaterialStatus};
use rusqlite::{params, Connection, OptionalExtension, Row};

const API_PATH: &str = "/api/v1/materials";

/// Extensions accepted for teacher uploads.
const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "docx", "txt"];

/// *   **`POST /`**: multipart upload (`file`, optional `title` and `courseId`).
/// *   **`GET /`**: the teacher's materials, optionally filtered by `?courseId=`.
/// *   **`GET /{material_id}`**: one material with its extracted text.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", post().to(upload::process))
        .route("", get().to(list::process))
        .route("/{material_id}", get().to(get::process))
}

const MATERIAL_COLUMNS: &str = "id, title, course_id, file_name, content, status, created_at";

fn material_from_row(row: &Row<'_>) -> rusqlite::Result<Material> {
    let status: String = row.get(5)?;
    Ok(Material {
        id: row.get(0)?,
        title: row.get(1)?,
        course_id: row.get(2)?,
        file_name: row.get(3)?,
        content: row.get(4)?,
        status: MaterialStatus::parse(&status).unwrap_or(MaterialStatus::Error),
        upload_date: row.get(6)?,
    })
}

pub(crate) fn load(conn: &Connection, material_id: &str) -> Result<Option<Material>, ApiError> {
    let sql = format!("SELECT {} FROM materials WHERE id = ?1", MATERIAL_COLUMNS);
    Ok(conn
        .query_row(&sql, params![material_id], material_from_row)
        .optional()?)
}

pub(crate) fn load_owned(
    conn: &Connection,
    owner_id: &str,
    material_id: &str,
) -> Result<Material, ApiError> {
    let sql = format!(
        "SELECT {} FROM materials WHERE id = ?1 AND owner_id = ?2",
        MATERIAL_COLUMNS
    );
    conn.query_row(&sql, params![material_id, owner_id], material_from_row)
        .optional()?
        .ok_or_else(|| ApiError::NotFound("Material not found".to_string()))
}
