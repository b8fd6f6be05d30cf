//! EduStream backend: teacher-facing REST API plus the public share routes
//! used by students.

pub mod assistant;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod files;
pub mod services;
pub mod state;

use actix_web::{web, HttpResponse};
use error::ApiError;
use serde_json::json;

/// Registers every route and the extractor error handlers. Used by `main`
/// and by the integration tests, so both see the same application.
pub fn configure_services(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(1024 * 1024)
            .error_handler(|err, _| ApiError::Unprocessable(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| ApiError::Unprocessable(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _| ApiError::Unprocessable(err.to_string()).into()),
    )
    .route("/api/v1/health", web::get().to(health))
    .service(services::auth::configure_routes())
    .service(services::courses::configure_routes())
    .service(services::materials::configure_routes())
    .service(services::quizzes::configure_routes())
    .service(services::quizzes::configure_ai_routes())
    .service(services::share::configure_routes())
    .service(services::submissions::configure_routes())
    .service(services::analytics::configure_routes())
    .service(services::dashboard::configure_routes());
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}
