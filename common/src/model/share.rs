use crate::model::quiz::PublicQuestion;
use crate::model::submission::{OcrRegion, SubmissionStatus};
use serde::{Deserialize, Serialize};

/// Kind of resource a public link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Quiz,
    Material,
    OcrResult,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Quiz => "quiz",
            ResourceType::Material => "material",
            ResourceType::OcrResult => "ocr_result",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "quiz" => Some(ResourceType::Quiz),
            "material" => Some(ResourceType::Material),
            "ocr_result" => Some(ResourceType::OcrResult),
            _ => None,
        }
    }
}

/// Response of `POST /share/create`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLink {
    /// Frontend URL a teacher can hand out.
    pub url: String,
    pub short_code: String,
}

/// Public payload behind a short code. The `resourceType` tag tells the
/// client which of the shapes below it received.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "resourceType", rename_all = "snake_case")]
pub enum SharedResource {
    Quiz(SharedQuiz),
    Material(SharedMaterial),
    OcrResult(SharedSubmission),
}

/// A shared quiz. Questions never carry their correct answers here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedQuiz {
    pub short_code: String,
    pub view_only: bool,
    pub allow_copy: bool,
    pub title: String,
    pub quiz_id: String,
    pub questions: Vec<PublicQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedMaterial {
    pub short_code: String,
    pub view_only: bool,
    pub allow_copy: bool,
    pub title: String,
    pub material_id: String,
    /// Material text, only present when the link allows copying.
    pub content: Option<String>,
    pub accept_uploads: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedSubmission {
    pub short_code: String,
    pub view_only: bool,
    pub allow_copy: bool,
    pub submission_id: String,
    pub student_name: String,
    pub status: SubmissionStatus,
    pub score: Option<i64>,
    pub questions: Vec<OcrRegion>,
}
