//! Hosted LLM / vision provider used for auto-grading, OCR and quiz
//! generation.
//!
//! Handlers only see the `Assistant` trait, held as `Arc<dyn Assistant>` in
//! `AppState`. `OpenAiAssistant` talks to a chat-completions API;
//! `DisabledAssistant` stands in when no API key is configured so callers
//! can degrade instead of failing.

mod openai;

pub use openai::OpenAiAssistant;

use crate::config::AppConfig;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use log::info;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

pub type AssistantFuture<'a, T> = BoxFuture<'a, Result<T, AssistantError>>;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("assistant is not configured")]
    Disabled,
    #[error("assistant request timed out")]
    Timeout,
    #[error("assistant request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("assistant returned an unusable reply: {0}")]
    Malformed(String),
}

/// Upper bound of the provider's grading scale.
pub const MAX_AUTO_GRADE: u8 = 20;

/// Provisional grade for an assignment, on a 0..=20 scale.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoGrade {
    pub score: u8,
    pub feedback: String,
}

impl AutoGrade {
    /// Score shown to teachers, 0..=100.
    pub fn percentage(&self) -> i64 {
        i64::from(self.score.min(MAX_AUTO_GRADE)) * 5
    }
}

pub struct QuizPrompt<'a> {
    pub text: &'a str,
    pub count: u32,
    pub difficulty: &'a str,
    pub question_type: &'a str,
}

pub trait Assistant: Send + Sync {
    fn is_enabled(&self) -> bool {
        true
    }

    /// Grades `answer` against the assignment described by `assignment`.
    fn grade_assignment<'a>(&'a self, assignment: &'a str, answer: &'a str)
        -> AssistantFuture<'a, AutoGrade>;

    /// Transcribes the text visible in an image.
    fn recognize_image<'a>(&'a self, image: &'a [u8], mime: &'a str)
        -> AssistantFuture<'a, String>;

    /// Returns raw question objects. `detailed` asks for explanations and
    /// topic tags; the plain variant is the cheaper fallback prompt.
    fn generate_quiz<'a>(
        &'a self,
        prompt: &'a QuizPrompt<'a>,
        detailed: bool,
    ) -> AssistantFuture<'a, Vec<Value>>;
}

pub struct DisabledAssistant;

impl Assistant for DisabledAssistant {
    fn is_enabled(&self) -> bool {
        false
    }

    fn grade_assignment<'a>(&'a self, _: &'a str, _: &'a str) -> AssistantFuture<'a, AutoGrade> {
        async { Err(AssistantError::Disabled) }.boxed()
    }

    fn recognize_image<'a>(&'a self, _: &'a [u8], _: &'a str) -> AssistantFuture<'a, String> {
        async { Err(AssistantError::Disabled) }.boxed()
    }

    fn generate_quiz<'a>(&'a self, _: &'a QuizPrompt<'a>, _: bool) -> AssistantFuture<'a, Vec<Value>> {
        async { Err(AssistantError::Disabled) }.boxed()
    }
}

pub fn from_config(config: &AppConfig) -> Arc<dyn Assistant> {
    if config.assistant_enabled() {
        info!("assistant enabled with model {}", config.openai_model);
        Arc::new(OpenAiAssistant::new(config))
    } else {
        info!("OPENAI_API_KEY not set, auto-grading and quiz generation are disabled");
        Arc::new(DisabledAssistant)
    }
}
