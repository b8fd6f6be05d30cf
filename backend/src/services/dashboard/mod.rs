//! Course overview for the teacher's landing page.

mod overview;

use actix_web::web::{get, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/v1/dashboard";

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/overview", get().to(overview::process))
}
