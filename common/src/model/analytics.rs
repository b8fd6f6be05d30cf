use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mean score of one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceItem {
    /// ISO date of the bucket (`YYYY-MM-DD`).
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicItem {
    pub name: String,
    pub score: i64,
    /// `green`, `yellow` or `red`.
    pub color_key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentTrend {
    Up,
    Down,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentMetric {
    pub id: usize,
    pub name: String,
    pub status: String,
    /// Average score, one decimal.
    pub progress: f64,
    pub trend: StudentTrend,
    pub color: String,
    pub submissions: usize,
    pub regular: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsData {
    pub performance: Vec<PerformanceItem>,
    pub topics: Vec<TopicItem>,
    pub students: Vec<StudentMetric>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionKind {
    Quiz,
    Assignment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalSubmission {
    pub kind: SubmissionKind,
    pub id: String,
    pub title: String,
    pub score: Option<i64>,
    pub status: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentJournalEntry {
    pub name: String,
    pub student_key: String,
    pub average_score: Option<f64>,
    pub submissions: Vec<JournalSubmission>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentJournal {
    pub course_id: String,
    pub students: Vec<StudentJournalEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherComment {
    pub course_id: String,
    pub student_key: String,
    pub comment: String,
    pub updated_at: DateTime<Utc>,
}
