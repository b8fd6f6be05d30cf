pub mod analytics;
pub mod auth;
pub mod courses;
pub mod dashboard;
pub mod materials;
pub mod quizzes;
pub mod share;
pub mod submissions;

use crate::error::ApiError;
use uuid::Uuid;

/// Canonical form of a client-supplied UUID; anything else is a 400.
pub(crate) fn parse_uuid(raw: &str, what: &str) -> Result<String, ApiError> {
    Uuid::parse_str(raw.trim())
        .map(|id| id.to_string())
        .map_err(|_| ApiError::BadRequest(format!("Invalid {} id", what)))
}

/// Grouping key of a freeform student name.
pub(crate) fn student_key(name: &str) -> String {
    name.trim().to_lowercase()
}

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}
