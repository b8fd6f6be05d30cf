//! Persistence and resolution of public links.
//!
//! `create` checks that the target resource belongs to the teacher, then
//! draws short codes until one is free (an existence check first, the UNIQUE
//! index as the final word). `resolve` enforces, in order: code format,
//! existence, expiry (410, regardless of password) and password (401).

use super::short_code;
use crate::auth;
use crate::db;
use crate::error::ApiError;
use crate::services::new_id;
use chrono::{DateTime, Utc};
use common::model::share::ResourceType;
use log::warn;
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Access rules attached to a link at creation.
#[derive(Debug, Clone)]
pub struct LinkPolicy {
    pub view_only: bool,
    pub allow_copy: bool,
    pub password_hash: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct PublicLink {
    pub id: String,
    pub owner_id: String,
    pub resource_id: String,
    pub resource_type: ResourceType,
    pub short_code: String,
    pub view_only: bool,
    pub allow_copy: bool,
    pub password_hash: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PublicLink {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let resource_type: String = row.get(3)?;
        Ok(PublicLink {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            resource_id: row.get(2)?,
            resource_type: ResourceType::parse(&resource_type).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    3,
                    rusqlite::types::Type::Text,
                    format!("unknown resource type {}", resource_type).into(),
                )
            })?,
            short_code: row.get(4)?,
            view_only: row.get(5)?,
            allow_copy: row.get(6)?,
            password_hash: row.get(7)?,
            expires_at: row.get(8)?,
            created_at: row.get(9)?,
        })
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(false, |at| at < now)
    }
}

const LINK_COLUMNS: &str = "id, owner_id, resource_id, resource_type, short_code, view_only, allow_copy, password_hash, expires_at, created_at";

/// True when `resource_id` of `resource_type` belongs to `owner_id`.
fn owns_resource(
    conn: &Connection,
    owner_id: &str,
    resource_type: ResourceType,
    resource_id: &str,
) -> rusqlite::Result<bool> {
    let sql = match resource_type {
        ResourceType::Quiz => {
            "SELECT 1 FROM quizzes q JOIN materials m ON m.id = q.material_id
             WHERE q.id = ?1 AND m.owner_id = ?2"
        }
        ResourceType::Material => "SELECT 1 FROM materials WHERE id = ?1 AND owner_id = ?2",
        ResourceType::OcrResult => {
            "SELECT 1 FROM assignment_submissions WHERE id = ?1 AND owner_id = ?2"
        }
    };
    Ok(conn
        .query_row(sql, params![resource_id, owner_id], |_| Ok(()))
        .optional()?
        .is_some())
}

fn code_exists(conn: &Connection, code: &str) -> rusqlite::Result<bool> {
    Ok(conn
        .query_row(
            "SELECT 1 FROM public_links WHERE short_code = ?1",
            params![code],
            |_| Ok(()),
        )
        .optional()?
        .is_some())
}

pub fn create(
    conn: &Connection,
    owner_id: &str,
    resource_id: &str,
    resource_type: ResourceType,
    policy: LinkPolicy,
) -> Result<PublicLink, ApiError> {
    if !owns_resource(conn, owner_id, resource_type, resource_id)? {
        // Same answer for "absent" and "someone else's".
        return Err(ApiError::NotFound(format!(
            "{} not found",
            match resource_type {
                ResourceType::Quiz => "Quiz",
                ResourceType::Material => "Material",
                ResourceType::OcrResult => "Submission",
            }
        )));
    }

    let id = new_id();
    let created_at = Utc::now();
    for attempt in 1..=short_code::MAX_ATTEMPTS {
        let code = short_code::issue();
        if code_exists(conn, &code)? {
            warn!("short code collision on attempt {}", attempt);
            continue;
        }
        let inserted = conn.execute(
            "INSERT INTO public_links(id, owner_id, resource_id, resource_type, short_code, view_only, allow_copy, password_hash, expires_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                id,
                owner_id,
                resource_id,
                resource_type.as_str(),
                code,
                policy.view_only,
                policy.allow_copy,
                policy.password_hash,
                policy.expires_at,
                created_at
            ],
        );
        match inserted {
            Ok(_) => {
                return Ok(PublicLink {
                    id,
                    owner_id: owner_id.to_string(),
                    resource_id: resource_id.to_string(),
                    resource_type,
                    short_code: code,
                    view_only: policy.view_only,
                    allow_copy: policy.allow_copy,
                    password_hash: policy.password_hash,
                    expires_at: policy.expires_at,
                    created_at,
                })
            }
            Err(e) if db::is_unique_violation(&e) => {
                warn!("short code taken between check and insert on attempt {}", attempt);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(ApiError::ServiceUnavailable(
        "Could not allocate a unique short code".to_string(),
    ))
}

pub fn find(conn: &Connection, code: &str) -> Result<Option<PublicLink>, ApiError> {
    let sql = format!("SELECT {} FROM public_links WHERE short_code = ?1", LINK_COLUMNS);
    Ok(conn
        .query_row(&sql, params![code], PublicLink::from_row)
        .optional()?)
}

pub fn resolve(
    conn: &Connection,
    code: &str,
    password: Option<&str>,
    now: DateTime<Utc>,
) -> Result<PublicLink, ApiError> {
    if !short_code::is_valid_format(code) {
        return Err(ApiError::BadRequest("Invalid short code format".to_string()));
    }
    let link = find(conn, code)?
        .ok_or_else(|| ApiError::NotFound("Shared link not found".to_string()))?;

    if link.is_expired(now) {
        return Err(ApiError::Gone("Shared link has expired".to_string()));
    }

    if let Some(hash) = &link.password_hash {
        let supplied = password.filter(|p| !p.is_empty());
        if !supplied.map_or(false, |p| auth::verify_password(p, hash)) {
            return Err(ApiError::Unauthorized(
                "Password required or invalid".to_string(),
            ));
        }
    }

    Ok(link)
}
