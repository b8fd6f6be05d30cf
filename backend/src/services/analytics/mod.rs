//! Course analytics: the aggregated dashboard, the per-student journal and
//! teacher comments on students.
//!
//! Quiz results reach a course through quiz → material → course; assignment
//! submissions carry the course directly.

pub mod aggregate;
mod comment;
mod journal;
mod performance;

use crate::auth::Teacher;
use crate::error::ApiError;
use crate::services::{courses, parse_uuid};
use actix_web::web::{get, patch, scope};
use actix_web::Scope;
use aggregate::ScoreRecord;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

const API_PATH: &str = "/api/v1/analytics";

/// *   **`GET /performance?courseId=`**: 7-day series, weak topics, students.
/// *   **`GET /student-journal?courseId=`**: every attempt per student plus
///     the teacher's comment.
/// *   **`PATCH /student-journal/comment`**: set the comment on a student.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/performance", get().to(performance::process))
        .route("/student-journal", get().to(journal::process))
        .route("/student-journal/comment", patch().to(comment::process))
}

pub(crate) struct QuizAttempt {
    pub id: String,
    pub student_name: String,
    pub quiz_title: String,
    pub score: i64,
    pub weak_topics: Vec<String>,
    pub date: DateTime<Utc>,
}

pub(crate) struct AssignmentAttempt {
    pub id: String,
    pub student_name: String,
    pub material_title: String,
    /// Manual score when present, else the auto-grade.
    pub score: Option<i64>,
    pub status: String,
    pub date: DateTime<Utc>,
}

/// Validates `?courseId=` and checks the course belongs to the teacher.
pub(crate) fn owned_course(
    conn: &Connection,
    teacher: &Teacher,
    course_id: Option<&str>,
) -> Result<String, ApiError> {
    let course_id = course_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("courseId is required".to_string()))?;
    let course_id = parse_uuid(course_id, "course")?;
    courses::ensure_owned(conn, &teacher.id, &course_id)?;
    Ok(course_id)
}

pub(crate) fn quiz_attempts(
    conn: &Connection,
    owner_id: &str,
    course_id: &str,
) -> Result<Vec<QuizAttempt>, ApiError> {
    let mut stmt = conn.prepare(
        "SELECT r.id, r.student_identifier, q.title, r.score, r.weak_topics, r.submission_date
         FROM student_results r
         JOIN quizzes q ON q.id = r.quiz_id
         JOIN materials m ON m.id = q.material_id
         WHERE r.owner_id = ?1 AND m.course_id = ?2
         ORDER BY r.submission_date",
    )?;
    let attempts = stmt
        .query_map(params![owner_id, course_id], |row| {
            let weak_topics: String = row.get(4)?;
            Ok(QuizAttempt {
                id: row.get(0)?,
                student_name: row.get(1)?,
                quiz_title: row.get(2)?,
                score: row.get(3)?,
                weak_topics: serde_json::from_str(&weak_topics).unwrap_or_default(),
                date: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(attempts)
}

pub(crate) fn assignment_attempts(
    conn: &Connection,
    owner_id: &str,
    course_id: &str,
) -> Result<Vec<AssignmentAttempt>, ApiError> {
    let mut stmt = conn.prepare(
        "SELECT s.id, s.student_name, COALESCE(m.title, ''), COALESCE(s.manual_score, s.accuracy),
                s.status, s.created_at
         FROM assignment_submissions s
         LEFT JOIN materials m ON m.id = s.material_id
         WHERE s.owner_id = ?1 AND s.course_id = ?2
         ORDER BY s.created_at",
    )?;
    let attempts = stmt
        .query_map(params![owner_id, course_id], |row| {
            Ok(AssignmentAttempt {
                id: row.get(0)?,
                student_name: row.get(1)?,
                material_title: row.get(2)?,
                score: row.get(3)?,
                status: row.get(4)?,
                date: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(attempts)
}

/// Every scored attempt of the course, as input for `aggregate`.
pub(crate) fn score_records(
    conn: &Connection,
    owner_id: &str,
    course_id: &str,
) -> Result<Vec<ScoreRecord>, ApiError> {
    let mut records: Vec<ScoreRecord> = quiz_attempts(conn, owner_id, course_id)?
        .into_iter()
        .map(|a| ScoreRecord {
            student_name: a.student_name,
            score: a.score as f64,
            date: a.date,
            weak_topics: a.weak_topics,
        })
        .collect();
    records.extend(
        assignment_attempts(conn, owner_id, course_id)?
            .into_iter()
            .filter_map(|a| {
                a.score.map(|score| ScoreRecord {
                    student_name: a.student_name,
                    score: score as f64,
                    date: a.date,
                    weak_topics: Vec::new(),
                })
            }),
    );
    Ok(records)
}
