//! `POST /api/v1/materials`.
//!
//! The multipart body is read with the shared intake (extension allow-list
//! and size cap), the file is stored under the
//! upload directory and its text is extracted on the spot. A file whose text
//! cannot be extracted is still kept, with status `error`.

use crate::auth::Teacher;
use crate::error::ApiError;
use crate::files::{self, extract::Extracted};
use crate::services::{courses, new_id, parse_uuid};
use crate::state::AppState;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use chrono::Utc;
use common::model::material::{MaterialStatus, MaterialUploadResponse};
use log::{info, warn};
use rusqlite::params;

pub async fn process(
    state: web::Data<AppState>,
    teacher: Teacher,
    payload: Multipart,
) -> impl Responder {
    match upload_material(&state, &teacher, payload).await {
        Ok(response) => HttpResponse::Created().json(response),
        Err(e) => e.error_response(),
    }
}

async fn upload_material(
    state: &AppState,
    teacher: &Teacher,
    payload: Multipart,
) -> Result<MaterialUploadResponse, ApiError> {
    let form = files::read_form(
        payload,
        super::ALLOWED_EXTENSIONS,
        state.config.max_upload_bytes,
    )
    .await?;
    form.accept_file()?;
    let file = form
        .file
        .as_ref()
        .ok_or_else(|| ApiError::BadRequest("A file is required".to_string()))?;

    let course_id = form
        .text("courseId")
        .or_else(|| form.text("course_id"))
        .map(|id| parse_uuid(id, "course"))
        .transpose()?;
    let title = form
        .text("title")
        .map(str::to_string)
        .unwrap_or_else(|| file.file_name.clone());

    let conn = state.db()?;
    if let Some(course_id) = &course_id {
        courses::ensure_owned(&conn, &teacher.id, course_id)?;
    }

    let path = files::store(&state.config.upload_dir, file)?;
    let (status, content, message) = match files::extract::extract(&file.extension, &file.bytes) {
        Ok(Extracted::Text(text)) => (
            MaterialStatus::Ready,
            Some(text).filter(|t| !t.is_empty()),
            "Material uploaded and processed".to_string(),
        ),
        Ok(_) => (
            MaterialStatus::Ready,
            None,
            "Material uploaded; text extraction is not available for this file type".to_string(),
        ),
        Err(e) => {
            warn!("text extraction failed for {}: {}", file.file_name, e);
            (
                MaterialStatus::Error,
                None,
                "Material stored but its text could not be extracted".to_string(),
            )
        }
    };

    let id = new_id();
    conn.execute(
        "INSERT INTO materials(id, owner_id, course_id, title, file_name, file_path, content, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            id,
            teacher.id,
            course_id,
            title,
            file.file_name,
            path.to_string_lossy().into_owned(),
            content,
            status.as_str(),
            Utc::now()
        ],
    )?;
    info!(
        "teacher {} uploaded material {} ({}, {} bytes)",
        teacher.id,
        id,
        file.file_name,
        file.bytes.len()
    );

    Ok(MaterialUploadResponse {
        id,
        status,
        message,
    })
}
