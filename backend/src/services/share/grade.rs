//! Scoring of quiz answers submitted through a public link.
//!
//! Pure logic, no storage: the submit handler feeds it the stored questions
//! and the student's answer map and persists what comes back.

use crate::error::ApiError;
use common::model::quiz::{GradeDetail, Question};
use serde_json::Value;
use std::collections::HashMap;

/// Longest weak-topic label kept per wrong answer, in characters.
pub const WEAK_TOPIC_MAX_CHARS: usize = 80;

#[derive(Debug, Clone, PartialEq)]
pub struct Grade {
    /// Rounded percentage of correct answers, 0..=100.
    pub score: i64,
    pub correct: usize,
    pub total: usize,
    pub details: Vec<GradeDetail>,
    pub weak_topics: Vec<String>,
}

/// Text form of a submitted answer. Numbers and booleans compare by their
/// JSON spelling, a missing or null answer is empty.
pub fn answer_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn normalize(answer: &str) -> String {
    answer.trim().to_lowercase()
}

fn weak_topic(question: &Question) -> String {
    let label = question
        .topic
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(question.text.trim());
    label.chars().take(WEAK_TOPIC_MAX_CHARS).collect()
}

pub fn grade(questions: &[Question], answers: &HashMap<String, Value>) -> Result<Grade, ApiError> {
    if questions.is_empty() {
        return Err(ApiError::BadRequest("Quiz has no questions".to_string()));
    }

    let mut correct = 0;
    let mut details = Vec::with_capacity(questions.len());
    let mut weak_topics = Vec::new();

    for question in questions {
        let user_answer = answer_text(answers.get(&question.id));
        let expected = normalize(&question.correct_answer);
        let is_correct = !expected.is_empty() && normalize(&user_answer) == expected;
        if is_correct {
            correct += 1;
        } else {
            weak_topics.push(weak_topic(question));
        }
        details.push(GradeDetail {
            question_id: question.id.clone(),
            user_answer,
            correct_answer: question.correct_answer.clone(),
            is_correct,
        });
    }

    let total = questions.len();
    let score = (correct as f64 / total as f64 * 100.0).round_ties_even() as i64;

    Ok(Grade {
        score,
        correct,
        total,
        details,
        weak_topics,
    })
}
