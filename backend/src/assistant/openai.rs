use super::{Assistant, AssistantError, AssistantFuture, AutoGrade, QuizPrompt, MAX_AUTO_GRADE};
use crate::config::AppConfig;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use futures_util::FutureExt;
use reqwest::Client;
use serde_json::{json, Value};

/// Longest slice of material text sent in one prompt.
const PROMPT_TEXT_LIMIT: usize = 4000;

/// Chat-completions client for OpenAI-compatible endpoints.
pub struct OpenAiAssistant {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiAssistant {
    pub fn new(config: &AppConfig) -> Self {
        OpenAiAssistant {
            http: Client::new(),
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn complete(&self, messages: Value, max_tokens: u32) -> Result<String, AssistantError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": 0.3,
            "max_tokens": max_tokens,
        });
        let reply: Value = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        reply
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AssistantError::Malformed("missing message content".to_string()))
    }
}

impl Assistant for OpenAiAssistant {
    fn grade_assignment<'a>(
        &'a self,
        assignment: &'a str,
        answer: &'a str,
    ) -> AssistantFuture<'a, AutoGrade> {
        async move {
            let prompt = format!(
                "Grade the student's answer to the assignment below on a scale from 0 to {max}.\n\
                 Reply strictly as JSON: {{\"score\": <0-{max}>, \"feedback\": \"<two sentences>\"}}\n\n\
                 Assignment:\n{assignment}\n\nStudent answer:\n{answer}",
                max = MAX_AUTO_GRADE,
                assignment = truncate(assignment, PROMPT_TEXT_LIMIT),
                answer = truncate(answer, PROMPT_TEXT_LIMIT),
            );
            let content = self
                .complete(
                    json!([
                        { "role": "system", "content": "You are a careful teacher grading homework." },
                        { "role": "user", "content": prompt }
                    ]),
                    400,
                )
                .await?;
            parse_grade(&content)
        }
        .boxed()
    }

    fn recognize_image<'a>(&'a self, image: &'a [u8], mime: &'a str) -> AssistantFuture<'a, String> {
        async move {
            let data_url = format!("data:{};base64,{}", mime, BASE64.encode(image));
            let content = self
                .complete(
                    json!([{
                        "role": "user",
                        "content": [
                            { "type": "text", "text": "Transcribe all handwritten or printed text in this image. Reply with the text only." },
                            { "type": "image_url", "image_url": { "url": data_url } }
                        ]
                    }]),
                    1500,
                )
                .await?;
            Ok(content.trim().to_string())
        }
        .boxed()
    }

    fn generate_quiz<'a>(
        &'a self,
        prompt: &'a QuizPrompt<'a>,
        detailed: bool,
    ) -> AssistantFuture<'a, Vec<Value>> {
        async move {
            let shape = if detailed {
                r#"{"text": "...", "type": "mcq|open|boolean", "options": ["..."], "correctAnswer": "...", "explanation": "...", "topic": "..."}"#
            } else {
                r#"{"text": "...", "type": "mcq|open|boolean", "options": ["..."], "correctAnswer": "..."}"#
            };
            let user = format!(
                "Create {count} {kind} questions of {difficulty} difficulty from the material below.\n\
                 Multiple choice questions have 4 options and the correct answer is one of them.\n\
                 Reply strictly with a JSON array of objects shaped like {shape}.\n\nMaterial:\n{text}",
                count = prompt.count,
                kind = prompt.question_type,
                difficulty = prompt.difficulty,
                shape = shape,
                text = truncate(prompt.text, PROMPT_TEXT_LIMIT),
            );
            let content = self
                .complete(
                    json!([
                        { "role": "system", "content": "You are an experienced teacher writing tests." },
                        { "role": "user", "content": user }
                    ]),
                    if detailed { 3000 } else { 2000 },
                )
                .await?;
            parse_questions(&content)
        }
        .boxed()
    }
}

fn truncate(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Models like to wrap JSON in markdown fences.
fn parse_json_reply(content: &str) -> Result<Value, AssistantError> {
    let trimmed = content.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();
    serde_json::from_str(unfenced).map_err(|e| AssistantError::Malformed(e.to_string()))
}

fn parse_grade(content: &str) -> Result<AutoGrade, AssistantError> {
    let value = parse_json_reply(content)?;
    let score = value
        .get("score")
        .and_then(|s| s.as_f64().or_else(|| s.as_str().and_then(|s| s.trim().parse().ok())))
        .ok_or_else(|| AssistantError::Malformed("grade without score".to_string()))?;
    let feedback = value
        .get("feedback")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();
    Ok(AutoGrade {
        score: score.round().clamp(0.0, f64::from(MAX_AUTO_GRADE)) as u8,
        feedback,
    })
}

fn parse_questions(content: &str) -> Result<Vec<Value>, AssistantError> {
    match parse_json_reply(content)? {
        Value::Array(items) => Ok(items),
        Value::Object(mut obj) => match obj.remove("questions") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(AssistantError::Malformed("expected a question array".to_string())),
        },
        _ => Err(AssistantError::Malformed("expected a question array".to_string())),
    }
}
