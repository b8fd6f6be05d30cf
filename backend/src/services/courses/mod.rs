//! Courses group materials (and through them quizzes and submissions) for
//! analytics and dashboards.

mod create;
mod delete;
mod list;

use crate::error::ApiError;
use actix_web::web::{delete, get, post, scope};
use actix_web::Scope;
use rusqlite::{params, Connection, OptionalExtension};

const API_PATH: &str = "/api/v1/courses";

const MAX_TITLE_CHARS: usize = 200;

/// *   **`POST /`**: create a course.
/// *   **`GET /`**: the teacher's courses with their material counts.
/// *   **`DELETE /{course_id}`**: delete a course; its materials and
///     submissions stay, detached.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", post().to(create::process))
        .route("", get().to(list::process))
        .route("/{course_id}", delete().to(delete::process))
}

/// NotFound unless `course_id` belongs to `owner_id`.
pub(crate) fn ensure_owned(conn: &Connection, owner_id: &str, course_id: &str) -> Result<(), ApiError> {
    conn.query_row(
        "SELECT 1 FROM courses WHERE id = ?1 AND owner_id = ?2",
        params![course_id, owner_id],
        |_| Ok(()),
    )
    .optional()?
    .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))
}
