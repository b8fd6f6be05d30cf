//! Normalization of client- and assistant-supplied questions.
//!
//! Input is a list of loosely shaped JSON objects. Anything that cannot
//! become a gradable question (no text, no correct answer, not an object) is
//! dropped rather than failing the whole batch.

use crate::services::new_id;
use common::model::quiz::{Question, QuestionType};
use common::requests::RawQuestion;
use serde_json::Value;
use std::collections::HashSet;

pub fn normalize(raw: &[Value], default_type: QuestionType) -> Vec<Question> {
    let mut seen = HashSet::new();
    raw.iter()
        .filter_map(|value| normalize_one(value, default_type))
        .map(|mut question| {
            // Grading is keyed by id, so a repeated id gets a fresh one.
            if !seen.insert(question.id.clone()) {
                question.id = new_id();
                seen.insert(question.id.clone());
            }
            question
        })
        .collect()
}

fn normalize_one(value: &Value, default_type: QuestionType) -> Option<Question> {
    if !value.is_object() {
        return None;
    }
    let raw: RawQuestion = serde_json::from_value(value.clone()).ok()?;

    let text = non_blank(raw.text.as_deref())?;
    let correct_answer = raw
        .correct_answer
        .as_ref()
        .and_then(scalar_text)
        .and_then(|a| non_blank(Some(&a)))?;

    let question_type = raw
        .question_type
        .as_deref()
        .and_then(QuestionType::parse)
        .unwrap_or(default_type);
    let id = raw
        .id
        .as_ref()
        .and_then(scalar_text)
        .and_then(|id| non_blank(Some(&id)))
        .unwrap_or_else(new_id);
    let options = raw
        .options
        .map(|options| {
            options
                .iter()
                .filter_map(scalar_text)
                .filter_map(|o| non_blank(Some(&o)))
                .collect::<Vec<_>>()
        })
        .filter(|options| !options.is_empty());

    Some(Question {
        id,
        question_type,
        text,
        options,
        correct_answer,
        explanation: non_blank(raw.explanation.as_deref()),
        topic: non_blank(raw.topic.as_deref()),
    })
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
