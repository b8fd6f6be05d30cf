//! `PATCH /api/v1/ocr/results/{submission_id}`.
//!
//! `manualScore` must lie in 0..=100. `correctedText` maps region ids to
//! replacement text; a corrected region is trusted from then on (confidence
//! `High`). Unknown region ids are ignored. Any correction marks the
//! submission `reviewed`.

use crate::auth::Teacher;
use crate::error::ApiError;
use crate::services::parse_uuid;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use chrono::Utc;
use common::model::submission::{Confidence, SubmissionDetail, SubmissionStatus};
use common::requests::ManualCorrection;
use log::info;
use rusqlite::params;

pub async fn process(
    state: web::Data<AppState>,
    teacher: Teacher,
    submission_id: web::Path<String>,
    payload: web::Json<ManualCorrection>,
) -> impl Responder {
    match apply_correction(&state, &teacher, &submission_id, payload.into_inner()) {
        Ok(detail) => HttpResponse::Ok().json(detail),
        Err(e) => e.error_response(),
    }
}

fn apply_correction(
    state: &AppState,
    teacher: &Teacher,
    submission_id: &str,
    correction: ManualCorrection,
) -> Result<SubmissionDetail, ApiError> {
    if let Some(score) = correction.manual_score {
        if !(0..=100).contains(&score) {
            return Err(ApiError::Unprocessable(
                "manualScore must be between 0 and 100".to_string(),
            ));
        }
    }

    let submission_id = parse_uuid(submission_id, "submission")?;
    let conn = state.db()?;
    let mut detail = super::load_owned(&conn, &teacher.id, &submission_id)?;

    if let Some(score) = correction.manual_score {
        detail.manual_score = Some(score);
    }
    if let Some(corrections) = &correction.corrected_text {
        for region in detail.questions.iter_mut() {
            if let Some(text) = corrections.get(&region.id) {
                region.recognized_text = text.clone();
                region.confidence = Confidence::High;
            }
        }
    }
    detail.status = SubmissionStatus::Reviewed;
    detail.updated_at = Utc::now();

    conn.execute(
        "UPDATE assignment_submissions
         SET manual_score = ?1, questions = ?2, status = ?3, updated_at = ?4
         WHERE id = ?5 AND owner_id = ?6",
        params![
            detail.manual_score,
            super::regions_json(&detail.questions)?,
            detail.status.as_str(),
            detail.updated_at,
            detail.id,
            teacher.id
        ],
    )?;
    info!("submission {} reviewed by teacher {}", detail.id, teacher.id);
    Ok(detail)
}
