use crate::auth::Teacher;
use crate::error::ApiError;
use crate::services::parse_uuid;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use chrono::Utc;
use common::model::submission::{
    ApprovedItem, BatchApproveResponse, BatchError, Confidence, SubmissionStatus,
};
use common::requests::BatchApproveRequest;
use rusqlite::params;

/// Approves every listed submission it can. Unknown, foreign or malformed
/// ids are reported in `errors` without aborting the rest.
pub async fn process(
    state: web::Data<AppState>,
    teacher: Teacher,
    payload: web::Json<BatchApproveRequest>,
) -> impl Responder {
    match batch_approve(&state, &teacher, &payload.ids) {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => e.error_response(),
    }
}

fn batch_approve(
    state: &AppState,
    teacher: &Teacher,
    ids: &[String],
) -> Result<BatchApproveResponse, ApiError> {
    if ids.is_empty() {
        return Err(ApiError::Unprocessable("ids must not be empty".to_string()));
    }

    let conn = state.db()?;
    let now = Utc::now();
    let mut approved = Vec::new();
    let mut errors = Vec::new();

    for raw_id in ids {
        let id = match parse_uuid(raw_id, "submission") {
            Ok(id) => id,
            Err(e) => {
                errors.push(BatchError {
                    id: raw_id.clone(),
                    error: e.to_string(),
                });
                continue;
            }
        };
        let Some(detail) = super::find_owned(&conn, &teacher.id, &id)? else {
            errors.push(BatchError {
                id: raw_id.clone(),
                error: "Submission not found".to_string(),
            });
            continue;
        };

        conn.execute(
            "UPDATE assignment_submissions SET status = ?1, updated_at = ?2 WHERE id = ?3 AND owner_id = ?4",
            params![SubmissionStatus::Graded.as_str(), now, id, teacher.id],
        )?;
        approved.push(ApprovedItem {
            id,
            status: SubmissionStatus::Graded.as_str().to_string(),
            low_confidence_warnings: detail
                .questions
                .iter()
                .filter(|r| r.confidence == Confidence::Low)
                .count(),
        });
    }

    let status = if errors.is_empty() { "success" } else { "partial" };
    Ok(BatchApproveResponse {
        status: status.to_string(),
        approved,
        errors,
    })
}
