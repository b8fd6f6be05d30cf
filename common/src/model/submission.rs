use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Review state of an assignment submission.
///
/// Every submission starts as `Pending`, even when the assistant produced a
/// provisional score. A teacher correction moves it to `Reviewed`, batch
/// approval to `Graded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Graded,
    Reviewed,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Graded => "graded",
            SubmissionStatus::Reviewed => "reviewed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(SubmissionStatus::Pending),
            "graded" => Some(SubmissionStatus::Graded),
            "reviewed" => Some(SubmissionStatus::Reviewed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Low,
}

/// One recognised region of a student's work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrRegion {
    pub id: String,
    pub label: String,
    pub recognized_text: String,
    pub confidence: Confidence,
    /// Similarity to the expected answer, in percent.
    #[serde(rename = "match")]
    pub match_percent: Option<i64>,
}

/// Response of `POST /share/{code}/upload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub submission_id: String,
    pub student_name: String,
    pub status: SubmissionStatus,
    pub score: Option<i64>,
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInfo {
    pub name: String,
    pub accuracy: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDetail {
    pub id: String,
    pub student: StudentInfo,
    pub status: SubmissionStatus,
    pub manual_score: Option<i64>,
    pub feedback: Option<String>,
    pub response_text: Option<String>,
    pub file: Option<String>,
    pub questions: Vec<OcrRegion>,
    pub material_id: String,
    pub course_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovedItem {
    pub id: String,
    pub status: String,
    pub low_confidence_warnings: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchError {
    pub id: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchApproveResponse {
    /// `success` when every id was approved, `partial` otherwise.
    pub status: String,
    pub approved: Vec<ApprovedItem>,
    pub errors: Vec<BatchError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueItem {
    pub id: String,
    pub student_name: String,
    pub filename: Option<String>,
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueResponse {
    pub queue: Vec<QueueItem>,
    pub total: usize,
}
