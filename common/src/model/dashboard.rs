use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PieChartItem {
    pub name: String,
    pub value: usize,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeedsReviewItem {
    pub id: String,
    pub name: String,
    pub subject: String,
    #[serde(rename = "type")]
    pub item_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub average_score: f64,
    pub students_count: usize,
    pub submissions_count: usize,
    pub needs_review_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub pie_chart: Vec<PieChartItem>,
    pub needs_review: Vec<NeedsReviewItem>,
    pub stats: DashboardStats,
}
