use crate::assistant::Assistant;
use crate::config::AppConfig;
use crate::db;
use crate::error::ApiError;
use rusqlite::Connection;
use std::sync::Arc;

/// Shared application state, injected into every handler as `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub assistant: Arc<dyn Assistant>,
}

impl AppState {
    pub fn new(config: AppConfig, assistant: Arc<dyn Assistant>) -> Self {
        AppState {
            config: Arc::new(config),
            assistant,
        }
    }

    /// Opens the per-request database connection.
    pub fn db(&self) -> Result<Connection, ApiError> {
        Ok(db::open(&self.config.database_path)?)
    }
}
