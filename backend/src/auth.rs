//! Bearer-token authentication for teacher routes.
//!
//! Tokens are opaque random strings stored in `auth_tokens`; the `Teacher`
//! extractor turns an `Authorization: Bearer <token>` header into the
//! authenticated teacher or answers 401.

use crate::error::ApiError;
use crate::state::AppState;
use actix_web::dev::Payload;
use actix_web::{http::header, web, FromRequest, HttpRequest};
use chrono::{DateTime, Duration, Utc};
use futures_util::future::{ready, Ready};
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;
use rusqlite::{params, Connection, OptionalExtension};

const TOKEN_LEN: usize = 40;

/// The authenticated teacher behind a request.
#[derive(Debug, Clone)]
pub struct Teacher {
    pub id: String,
    pub email: String,
}

impl FromRequest for Teacher {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<Teacher, ApiError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| ApiError::Internal("application state is not registered".to_string()))?;
    let token = bearer_token(req)
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;
    let conn = state.db()?;
    lookup_token(&conn, token, Utc::now())?
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired token".to_string()))
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

fn lookup_token(
    conn: &Connection,
    token: &str,
    now: DateTime<Utc>,
) -> Result<Option<Teacher>, ApiError> {
    let row = conn
        .query_row(
            "SELECT t.id, t.email, a.expires_at
             FROM auth_tokens a JOIN teachers t ON t.id = a.teacher_id
             WHERE a.token = ?1",
            params![token],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, DateTime<Utc>>(2)?,
                ))
            },
        )
        .optional()?;

    Ok(match row {
        Some((id, email, expires_at)) if expires_at > now => Some(Teacher { id, email }),
        _ => None,
    })
}

/// Stores a fresh token for `teacher_id` and returns it with its expiry.
pub fn issue_token(
    conn: &Connection,
    teacher_id: &str,
    ttl_minutes: i64,
) -> Result<(String, DateTime<Utc>), ApiError> {
    let token: String = OsRng
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect();
    let now = Utc::now();
    let expires_at = now + Duration::minutes(ttl_minutes);
    conn.execute(
        "INSERT INTO auth_tokens(token, teacher_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
        params![token, teacher_id, now, expires_at],
    )?;
    Ok((token, expires_at))
}

pub fn hash_password(password: &str, cost: u32) -> Result<String, ApiError> {
    bcrypt::hash(password, cost)
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {}", e)))
}

/// A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[test]
    fn expired_tokens_do_not_authenticate() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("auth.sqlite");
        db::init(&path).expect("init");
        let conn = db::open(&path).expect("open");
        conn.execute(
            "INSERT INTO teachers(id, email, password_hash, created_at) VALUES ('t1', 'a@b.c', 'x', ?1)",
            params![Utc::now()],
        )
        .expect("teacher");

        let (token, expires_at) = issue_token(&conn, "t1", 30).expect("token");
        assert_eq!(token.len(), TOKEN_LEN);

        let found = lookup_token(&conn, &token, Utc::now()).expect("lookup");
        assert_eq!(found.map(|t| t.id).as_deref(), Some("t1"));

        let later = expires_at + Duration::seconds(1);
        assert!(lookup_token(&conn, &token, later).expect("lookup").is_none());
        assert!(lookup_token(&conn, "nope", Utc::now()).expect("lookup").is_none());
    }

    #[test]
    fn password_hash_roundtrip() {
        let hash = hash_password("correct horse", 4).expect("hash");
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
    }
}
