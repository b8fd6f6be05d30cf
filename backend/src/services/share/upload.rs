//! # Assignment intake
//!
//! `POST /api/v1/share/{code}/upload` accepts a student's work against a
//! shared material: a multipart form with `studentName`, an optional
//! `responseText` and an optional `file` (at least one of the two).
//!
//! Checks, all before anything is written:
//! 1.  the short code is well formed and resolves (expiry, password), so a
//!     dead link answers 410 whatever the form carries;
//! 2.  the link points at a material;
//! 3.  the file extension is allowed and the file fits the size cap;
//! 4.  a student name is present and the student has not submitted yet.
//!
//! The file is then stored and its text extracted where possible (plain
//! text, DOCX, images through the assistant's OCR). When the assistant is
//! enabled the combined text is auto-graded. Grading or OCR failures are
//! logged and never fail the upload; the submission always starts `pending`.

use super::{links, short_code, truncate_name};
use crate::assistant::AutoGrade;
use crate::db;
use crate::error::ApiError;
use crate::files::{self, extract::Extracted, UploadedFile};
use crate::services::{materials, new_id, student_key, submissions};
use crate::state::AppState;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use chrono::Utc;
use common::model::material::Material;
use common::model::share::ResourceType;
use common::model::submission::{Confidence, OcrRegion, SubmissionReceipt, SubmissionStatus};
use common::requests::PasswordQuery;
use log::{info, warn};
use rusqlite::{params, Connection, OptionalExtension};

const ALLOWED_EXTENSIONS: &[&str] = &[
    "pdf", "docx", "txt", "png", "jpg", "jpeg", "bmp", "tif", "tiff", "webp",
];

/// Material text sent along as grading context, in characters.
const MAX_ASSIGNMENT_CONTEXT_CHARS: usize = 4000;

pub async fn process(
    state: web::Data<AppState>,
    code: web::Path<String>,
    query: web::Query<PasswordQuery>,
    payload: Multipart,
) -> impl Responder {
    match submit_assignment(&state, &code, query.into_inner().password, payload).await {
        Ok(receipt) => HttpResponse::Ok().json(receipt),
        Err(e) => e.error_response(),
    }
}

async fn submit_assignment(
    state: &AppState,
    code: &str,
    password: Option<String>,
    payload: Multipart,
) -> Result<SubmissionReceipt, ApiError> {
    if !short_code::is_valid_format(code) {
        return Err(ApiError::BadRequest("Invalid short code format".to_string()));
    }

    let form = files::read_form(payload, ALLOWED_EXTENSIONS, state.config.max_upload_bytes).await?;
    let password = password.or_else(|| form.text("password").map(str::to_string));

    let (link, material, student_name, key) = {
        let conn = state.db()?;
        let link = links::resolve(&conn, code, password.as_deref(), Utc::now())?;
        if link.resource_type != ResourceType::Material {
            return Err(ApiError::BadRequest(
                "Uploads are only accepted for shared materials".to_string(),
            ));
        }
        form.accept_file()?;

        let student_name = form
            .text("studentName")
            .or_else(|| form.text("student_name"))
            .map(truncate_name)
            .ok_or_else(|| ApiError::BadRequest("studentName is required".to_string()))?;
        if form.text("responseText").is_none() && form.file.is_none() {
            return Err(ApiError::BadRequest(
                "Provide a response text or a file".to_string(),
            ));
        }

        let key = student_key(&student_name);
        if already_submitted(&conn, &link.short_code, &key)? {
            return Err(duplicate());
        }
        let material = materials::load(&conn, &link.resource_id)?
            .ok_or_else(|| ApiError::NotFound("Material not found".to_string()))?;
        (link, material, student_name, key)
    };

    let response_text = form.text("responseText").map(str::to_string);
    let stored = match &form.file {
        Some(file) => Some((file, files::store(&state.config.upload_dir, file)?)),
        None => None,
    };

    let mut regions = Vec::new();
    if let Some(text) = &response_text {
        regions.push(OcrRegion {
            id: "response".to_string(),
            label: "Written response".to_string(),
            recognized_text: text.clone(),
            confidence: Confidence::High,
            match_percent: None,
        });
    }
    if let Some((file, _)) = &stored {
        if let Some(region) = read_file(state, file).await {
            regions.push(region);
        }
    }

    let combined = regions
        .iter()
        .map(|r| r.recognized_text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");
    let auto_grade = auto_grade(state, &material, &combined).await;
    if let Some(grade) = &auto_grade {
        for region in regions.iter_mut() {
            region.match_percent = Some(grade.percentage());
        }
    }

    let id = new_id();
    let now = Utc::now();
    let conn = state.db()?;
    let inserted = conn.execute(
        "INSERT INTO assignment_submissions(
            id, owner_id, share_code, material_id, student_name, student_key, accuracy,
            response_text, file_name, file_path, feedback, questions, status, course_id,
            created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?15)",
        params![
            id,
            link.owner_id,
            link.short_code,
            material.id,
            student_name,
            key,
            auto_grade.as_ref().map(AutoGrade::percentage),
            response_text,
            stored.as_ref().map(|(file, _)| file.file_name.clone()),
            stored
                .as_ref()
                .map(|(_, path)| path.to_string_lossy().into_owned()),
            auto_grade.as_ref().map(|g| g.feedback.clone()),
            submissions::regions_json(&regions)?,
            SubmissionStatus::Pending.as_str(),
            material.course_id,
            now
        ],
    );
    match inserted {
        Ok(_) => {}
        // Lost a race against a concurrent upload from the same student.
        Err(e) if db::is_unique_violation(&e) => return Err(duplicate()),
        Err(e) => return Err(e.into()),
    }
    info!(
        "assignment {} received via {} ({} regions, graded: {})",
        id,
        link.short_code,
        regions.len(),
        auto_grade.is_some()
    );

    Ok(SubmissionReceipt {
        submission_id: id,
        student_name,
        status: SubmissionStatus::Pending,
        score: auto_grade.as_ref().map(AutoGrade::percentage),
        feedback: auto_grade.map(|g| g.feedback),
    })
}

fn duplicate() -> ApiError {
    ApiError::Conflict("This student has already submitted work for this link".to_string())
}

fn already_submitted(conn: &Connection, share_code: &str, key: &str) -> Result<bool, ApiError> {
    Ok(conn
        .query_row(
            "SELECT 1 FROM assignment_submissions WHERE share_code = ?1 AND student_key = ?2",
            params![share_code, key],
            |_| Ok(()),
        )
        .optional()?
        .is_some())
}

/// Region for the uploaded file, or `None` when no text could be obtained.
async fn read_file(state: &AppState, file: &UploadedFile) -> Option<OcrRegion> {
    let (text, confidence) = match files::extract::extract(&file.extension, &file.bytes) {
        Ok(Extracted::Text(text)) => (text, Confidence::High),
        Ok(Extracted::Image) if state.assistant.is_enabled() => {
            let mime = mime_guess::from_ext(&file.extension).first_or_octet_stream();
            match state.assistant.recognize_image(&file.bytes, mime.as_ref()).await {
                Ok(text) => (text.trim().to_string(), Confidence::Low),
                Err(e) => {
                    warn!("OCR failed for {}: {}", file.file_name, e);
                    return None;
                }
            }
        }
        Ok(_) => return None,
        Err(e) => {
            warn!("could not extract text from {}: {}", file.file_name, e);
            return None;
        }
    };
    if text.is_empty() {
        return None;
    }
    Some(OcrRegion {
        id: "file".to_string(),
        label: file.file_name.clone(),
        recognized_text: text,
        confidence,
        match_percent: None,
    })
}

async fn auto_grade(state: &AppState, material: &Material, answer: &str) -> Option<AutoGrade> {
    if !state.assistant.is_enabled() || answer.trim().is_empty() {
        return None;
    }
    let context: String = material
        .content
        .as_deref()
        .unwrap_or_default()
        .chars()
        .take(MAX_ASSIGNMENT_CONTEXT_CHARS)
        .collect();
    let assignment = format!("{}\n\n{}", material.title, context);
    match state.assistant.grade_assignment(assignment.trim(), answer).await {
        Ok(grade) => Some(grade),
        Err(e) => {
            warn!("auto-grading failed for material {}: {}", material.id, e);
            None
        }
    }
}
