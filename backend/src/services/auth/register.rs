use super::{normalize_email, MIN_PASSWORD_CHARS};
use crate::auth;
use crate::db;
use crate::error::ApiError;
use crate::services::new_id;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use chrono::Utc;
use common::model::teacher::{AuthResponse, TeacherProfile};
use common::requests::RegisterRequest;
use log::info;
use rusqlite::params;

pub async fn process(
    state: web::Data<AppState>,
    payload: web::Json<RegisterRequest>,
) -> impl Responder {
    match register(&state, payload.into_inner()) {
        Ok(response) => HttpResponse::Created().json(response),
        Err(e) => e.error_response(),
    }
}

fn register(state: &AppState, payload: RegisterRequest) -> Result<AuthResponse, ApiError> {
    let email = normalize_email(&payload.email);
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::Unprocessable("A valid email is required".to_string()));
    }
    if payload.password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(ApiError::Unprocessable(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_CHARS
        )));
    }
    let display_name = payload
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    let password_hash = auth::hash_password(&payload.password, state.config.password_cost)?;
    let id = new_id();
    let conn = state.db()?;
    let inserted = conn.execute(
        "INSERT INTO teachers(id, email, password_hash, display_name, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, email, password_hash, display_name, Utc::now()],
    );
    match inserted {
        Ok(_) => {}
        Err(e) if db::is_unique_violation(&e) => {
            return Err(ApiError::Conflict("Email is already registered".to_string()))
        }
        Err(e) => return Err(e.into()),
    }

    let (token, expires_at) = auth::issue_token(&conn, &id, state.config.token_ttl_minutes)?;
    info!("registered teacher {}", id);
    Ok(AuthResponse {
        token,
        expires_at,
        teacher: TeacherProfile {
            id,
            email,
            display_name,
        },
    })
}
