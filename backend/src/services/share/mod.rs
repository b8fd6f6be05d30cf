//! # Public sharing
//!
//! Teachers publish a quiz, a material or a reviewed submission under an
//! 8-character short code. Everything except `POST /create` is reachable
//! without an account; access is governed by the link itself (expiry,
//! optional password).
//!
//! ## Sub-modules
//! - `short_code`: code generation and the lookup format check.
//! - `links`: link persistence and resolution.
//! - `grade`: scoring of quiz answers.
//! - `create`, `resolve`, `submit`, `upload`: the HTTP handlers.

mod create;
pub mod grade;
pub mod links;
mod resolve;
pub mod short_code;
mod submit;
mod upload;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/v1/share";

/// Longest stored student name, in characters.
const MAX_STUDENT_NAME_CHARS: usize = 255;

/// *   **`POST /create`**: teacher-only. Publishes a resource and answers
///     `201 Created` with its URL and short code.
/// *   **`GET /{code}`**: the public payload. Quiz answer keys are stripped;
///     material text is only included when the link allows copying.
/// *   **`POST /{code}/submit`**: grades quiz answers and records the result.
/// *   **`POST /{code}/upload`**: multipart assignment upload against a shared
///     material.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/create", post().to(create::process))
        .route("/{code}", get().to(resolve::process))
        .route("/{code}/submit", post().to(submit::process))
        .route("/{code}/upload", post().to(upload::process))
}

fn truncate_name(name: &str) -> String {
    name.chars().take(MAX_STUDENT_NAME_CHARS).collect()
}
