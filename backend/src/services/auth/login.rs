use super::normalize_email;
use crate::auth;
use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::teacher::{AuthResponse, TeacherProfile};
use common::requests::LoginRequest;
use log::warn;
use rusqlite::{params, OptionalExtension};

pub async fn process(state: web::Data<AppState>, payload: web::Json<LoginRequest>) -> impl Responder {
    match login(&state, payload.into_inner()) {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => e.error_response(),
    }
}

fn login(state: &AppState, payload: LoginRequest) -> Result<AuthResponse, ApiError> {
    let email = normalize_email(&payload.email);
    let conn = state.db()?;
    let row = conn
        .query_row(
            "SELECT id, password_hash, display_name FROM teachers WHERE email = ?1",
            params![email],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            },
        )
        .optional()?;

    // Unknown email and wrong password get the same answer.
    let (id, display_name) = match row {
        Some((id, hash, display_name)) if auth::verify_password(&payload.password, &hash) => {
            (id, display_name)
        }
        _ => {
            warn!("failed login attempt for {}", email);
            return Err(ApiError::Unauthorized("Invalid email or password".to_string()));
        }
    };

    let (token, expires_at) = auth::issue_token(&conn, &id, state.config.token_ttl_minutes)?;
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
