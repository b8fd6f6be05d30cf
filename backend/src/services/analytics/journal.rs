//! `GET /api/v1/analytics/student-journal?courseId=`.
//!
//! Lists every student of the course with all their attempts (quizzes and
//! assignments, oldest first), the mean of the scored ones and the teacher's
//! comment. Students are keyed by their trimmed, lowercased name.

use crate::auth::Teacher;
use crate::error::ApiError;
use crate::services::student_key;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::analytics::{
    JournalSubmission, StudentJournal, StudentJournalEntry, SubmissionKind,
};
use common::requests::CourseQuery;
use rusqlite::params;
use std::collections::HashMap;

pub async fn process(
    state: web::Data<AppState>,
    teacher: Teacher,
    query: web::Query<CourseQuery>,
) -> impl Responder {
    match student_journal(&state, &teacher, query.course_id.as_deref()) {
        Ok(journal) => HttpResponse::Ok().json(journal),
        Err(e) => e.error_response(),
    }
}

fn student_journal(
    state: &AppState,
    teacher: &Teacher,
    course_id: Option<&str>,
) -> Result<StudentJournal, ApiError> {
    let conn = state.db()?;
    let course_id = super::owned_course(&conn, teacher, course_id)?;

    let mut entries: Vec<(String, String, Vec<JournalSubmission>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut push = |name: &str, submission: JournalSubmission| {
        let key = student_key(name);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            entries.push((key, name.trim().to_string(), Vec::new()));
            entries.len() - 1
        });
        entries[slot].2.push(submission);
    };

    for attempt in super::quiz_attempts(&conn, &teacher.id, &course_id)? {
        push(
            &attempt.student_name,
            JournalSubmission {
                kind: SubmissionKind::Quiz,
                id: attempt.id,
                title: attempt.quiz_title,
                score: Some(attempt.score),
                status: "completed".to_string(),
                date: attempt.date,
            },
        );
    }
    for attempt in super::assignment_attempts(&conn, &teacher.id, &course_id)? {
        push(
            &attempt.student_name,
            JournalSubmission {
                kind: SubmissionKind::Assignment,
                id: attempt.id,
                title: attempt.material_title,
                score: attempt.score,
                status: attempt.status,
                date: attempt.date,
            },
        );
    }

    let mut stmt = conn.prepare(
        "SELECT student_key, comment FROM teacher_comments WHERE owner_id = ?1 AND course_id = ?2",
    )?;
    let mut comments: HashMap<String, String> = stmt
        .query_map(params![teacher.id, course_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<Result<_, _>>()?;

    let mut students: Vec<StudentJournalEntry> = entries
        .into_iter()
        .map(|(key, name, mut submissions)| {
            submissions.sort_by_key(|s| s.date);
            let scores: Vec<i64> = submissions.iter().filter_map(|s| s.score).collect();
            let average_score = if scores.is_empty() {
                None
            } else {
                let mean = scores.iter().sum::<i64>() as f64 / scores.len() as f64;
                Some((mean * 10.0).round_ties_even() / 10.0)
            };
            StudentJournalEntry {
                comment: comments.remove(&key),
                name,
                student_key: key,
                average_score,
                submissions,
            }
        })
        .collect();
    students.sort_by(|a, b| a.student_key.cmp(&b.student_key));

    Ok(StudentJournal {
        course_id,
        students,
    })
}
