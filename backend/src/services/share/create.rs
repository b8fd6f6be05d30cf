use super::links::{self, LinkPolicy};
use crate::auth::{self, Teacher};
use crate::error::ApiError;
use crate::services::parse_uuid;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::share::{ResourceType, ShareLink};
use common::requests::ShareConfig;
use log::info;

pub async fn process(
    state: web::Data<AppState>,
    teacher: Teacher,
    payload: web::Json<ShareConfig>,
) -> impl Responder {
    match create_link(&state, &teacher, payload.into_inner()) {
        Ok(link) => HttpResponse::Created().json(link),
        Err(e) => e.error_response(),
    }
}

fn create_link(state: &AppState, teacher: &Teacher, config: ShareConfig) -> Result<ShareLink, ApiError> {
    let what = match config.resource_type {
        ResourceType::Quiz => "quiz",
        ResourceType::Material => "material",
        ResourceType::OcrResult => "submission",
    };
    let resource_id = parse_uuid(&config.resource_id, what)?;

    let password_hash = match config.password.as_deref().filter(|p| !p.is_empty()) {
        Some(password) => Some(auth::hash_password(password, state.config.password_cost)?),
        None => None,
    };
    let policy = LinkPolicy {
        view_only: config.view_only.unwrap_or(true),
        allow_copy: config.allow_copy.unwrap_or(false),
        password_hash,
        expires_at: config.expires_at,
    };

    let conn = state.db()?;
    let link = links::create(&conn, &teacher.id, &resource_id, config.resource_type, policy)?;
    info!(
        "teacher {} shared {} {} as {}",
        teacher.id,
        link.resource_type.as_str(),
        link.resource_id,
        link.short_code
    );

    Ok(ShareLink {
        url: format!(
            "{}/#/shared/{}",
            state.config.public_base_url.trim_end_matches('/'),
            link.short_code
        ),
        short_code: link.short_code,
    })
}
