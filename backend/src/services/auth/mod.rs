//! Teacher accounts. Register and login both answer with a fresh bearer
//! token; every other teacher route authenticates through the `Teacher`
//! extractor.

mod login;
mod me;
mod register;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/v1/auth";

const MIN_PASSWORD_CHARS: usize = 8;

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/register", post().to(register::process))
        .route("/login", post().to(login::process))
        .route("/me", get().to(me::process))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
