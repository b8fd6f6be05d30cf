//! Teacher review of anonymous assignment submissions.
//!
//! A submission arrives `pending` with the regions recognised at intake and,
//! when the assistant is on, a provisional score. Teachers correct it
//! (`reviewed`) or approve it in bulk (`graded`).

mod batch_approve;
mod correct;
mod get;
mod queue;

use crate::error::ApiError;
use actix_web::web::{get, patch, post, scope};
use actix_web::Scope;
use common::model::submission::{
    OcrRegion, StudentInfo, SubmissionDetail, SubmissionStatus,
};
use rusqlite::{params, Connection, OptionalExtension, Row};

const API_PATH: &str = "/api/v1/ocr";

/// *   **`GET /results/{submission_id}`**: one submission with its regions.
/// *   **`PATCH /results/{submission_id}`**: manual score and region corrections.
/// *   **`POST /batch-approve`**: mark several submissions as graded.
/// *   **`GET /queue`**: pending submissions, newest first.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/results/{submission_id}", get().to(get::process))
        .route("/results/{submission_id}", patch().to(correct::process))
        .route("/batch-approve", post().to(batch_approve::process))
        .route("/queue", get().to(queue::process))
}

pub(crate) fn regions_json(regions: &[OcrRegion]) -> Result<String, ApiError> {
    serde_json::to_string(regions)
        .map_err(|e| ApiError::Internal(format!("could not serialise regions: {}", e)))
}

pub(crate) fn regions_from_json(raw: &str) -> Vec<OcrRegion> {
    serde_json::from_str(raw).unwrap_or_default()
}

fn status_from(raw: &str) -> SubmissionStatus {
    SubmissionStatus::parse(raw).unwrap_or(SubmissionStatus::Pending)
}

fn detail_from_row(row: &Row<'_>) -> rusqlite::Result<SubmissionDetail> {
    let status: String = row.get(3)?;
    let questions: String = row.get(8)?;
    Ok(SubmissionDetail {
        id: row.get(0)?,
        student: StudentInfo {
            name: row.get(1)?,
            accuracy: row.get(2)?,
        },
        status: status_from(&status),
        manual_score: row.get(4)?,
        feedback: row.get(5)?,
        response_text: row.get(6)?,
        file: row.get(7)?,
        questions: regions_from_json(&questions),
        material_id: row.get(9)?,
        course_id: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

/// The submission if it belongs to `owner_id`.
pub(crate) fn find_owned(
    conn: &Connection,
    owner_id: &str,
    submission_id: &str,
) -> Result<Option<SubmissionDetail>, ApiError> {
    Ok(conn
        .query_row(
            "SELECT id, student_name, accuracy, status, manual_score, feedback, response_text,
                    file_name, questions, material_id, course_id, created_at, updated_at
             FROM assignment_submissions WHERE id = ?1 AND owner_id = ?2",
            params![submission_id, owner_id],
            detail_from_row,
        )
        .optional()?)
}

pub(crate) fn load_owned(
    conn: &Connection,
    owner_id: &str,
    submission_id: &str,
) -> Result<SubmissionDetail, ApiError> {
    find_owned(conn, owner_id, submission_id)?
        .ok_or_else(|| ApiError::NotFound("Submission not found".to_string()))
}
