use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialStatus {
    Processing,
    Ready,
    Error,
}

impl MaterialStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialStatus::Processing => "processing",
            MaterialStatus::Ready => "ready",
            MaterialStatus::Error => "error",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "processing" => Some(MaterialStatus::Processing),
            "ready" => Some(MaterialStatus::Ready),
            "error" => Some(MaterialStatus::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: String,
    pub title: String,
    pub course_id: Option<String>,
    pub file_name: Option<String>,
    pub content: Option<String>,
    pub status: MaterialStatus,
    pub upload_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialUploadResponse {
    pub id: String,
    pub status: MaterialStatus,
    pub message: String,
}
