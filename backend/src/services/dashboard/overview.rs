//! `GET /api/v1/dashboard/overview?courseId=`.
//!
//! Quiz scores are bucketed for the pie chart (excellent ≥85, good ≥70,
//! satisfactory ≥50, attention below). Pending assignment submissions feed
//! the review list, newest first and capped at eight entries.

use crate::auth::Teacher;
use crate::error::ApiError;
use crate::services::{analytics, student_key};
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::dashboard::{DashboardData, DashboardStats, NeedsReviewItem, PieChartItem};
use common::model::submission::SubmissionStatus;
use common::requests::CourseQuery;
use std::collections::HashSet;

const MAX_REVIEW_ITEMS: usize = 8;

pub async fn process(
    state: web::Data<AppState>,
    teacher: Teacher,
    query: web::Query<CourseQuery>,
) -> impl Responder {
    match overview(&state, &teacher, query.course_id.as_deref()) {
        Ok(data) => HttpResponse::Ok().json(data),
        Err(e) => e.error_response(),
    }
}

fn overview(
    state: &AppState,
    teacher: &Teacher,
    course_id: Option<&str>,
) -> Result<DashboardData, ApiError> {
    let conn = state.db()?;
    let course_id = analytics::owned_course(&conn, teacher, course_id)?;
    let quizzes = analytics::quiz_attempts(&conn, &teacher.id, &course_id)?;
    let assignments = analytics::assignment_attempts(&conn, &teacher.id, &course_id)?;

    let scores: Vec<i64> = quizzes.iter().map(|a| a.score).collect();
    let pie_chart = pie_chart(&scores);
    let average_score = if scores.is_empty() {
        0.0
    } else {
        let mean = scores.iter().sum::<i64>() as f64 / scores.len() as f64;
        (mean * 10.0).round_ties_even() / 10.0
    };

    let students: HashSet<String> = quizzes
        .iter()
        .map(|a| student_key(&a.student_name))
        .chain(assignments.iter().map(|a| student_key(&a.student_name)))
        .collect();

    let mut pending: Vec<_> = assignments
        .iter()
        .filter(|a| a.status == SubmissionStatus::Pending.as_str())
        .collect();
    pending.sort_by(|a, b| b.date.cmp(&a.date));
    let needs_review_count = pending.len();
    let needs_review = pending
        .into_iter()
        .take(MAX_REVIEW_ITEMS)
        .map(|a| NeedsReviewItem {
            id: a.id.clone(),
            name: a.student_name.clone(),
            subject: a.material_title.clone(),
            item_type: "assignment".to_string(),
        })
        .collect();

    Ok(DashboardData {
        pie_chart,
        needs_review,
        stats: DashboardStats {
            average_score,
            students_count: students.len(),
            submissions_count: quizzes.len() + assignments.len(),
            needs_review_count,
        },
    })
}

fn pie_chart(scores: &[i64]) -> Vec<PieChartItem> {
    let count = |range: std::ops::Range<i64>| scores.iter().filter(|s| range.contains(*s)).count();
    vec![
        PieChartItem {
            name: "Excellent".to_string(),
            value: count(85..i64::MAX),
            color: "#10b981".to_string(),
        },
        PieChartItem {
            name: "Good".to_string(),
            value: count(70..85),
            color: "#3b82f6".to_string(),
        },
        PieChartItem {
            name: "Satisfactory".to_string(),
            value: count(50..70),
            color: "#f59e0b".to_string(),
        },
        PieChartItem {
            name: "Needs attention".to_string(),
            value: count(i64::MIN..50),
            color: "#ef4444".to_string(),
        },
    ]
}
