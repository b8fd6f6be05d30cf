#![allow(dead_code, unused_macros)]

use edustream_backend::assistant::{
    Assistant, AssistantError, AssistantFuture, AutoGrade, DisabledAssistant, QuizPrompt,
};
use edustream_backend::config::AppConfig;
use edustream_backend::db;
use edustream_backend::state::AppState;
use actix_web::web;
use futures_util::FutureExt;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Builds the real application around `$state` (a `web::Data<AppState>`).
macro_rules! init_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state.clone())
                .configure(edustream_backend::configure_services),
        )
        .await
    };
}

/// Registers a teacher and evaluates to its bearer token.
macro_rules! register_teacher {
    ($app:expr, $email:expr) => {{
        let req = actix_web::test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(serde_json::json!({
                "email": $email,
                "password": "correct horse battery",
            }))
            .to_request();
        let body: serde_json::Value = actix_web::test::call_and_read_body_json(&$app, req).await;
        body["token"]
            .as_str()
            .expect("token in register response")
            .to_string()
    }};
}

/// Sends `$req` (a `TestRequest`) and evaluates to `(status, json body)`.
macro_rules! send {
    ($app:expr, $req:expr) => {{
        let resp = actix_web::test::call_service(&$app, $req.to_request()).await;
        let status = resp.status();
        let bytes = actix_web::test::read_body(resp).await;
        let body: serde_json::Value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, body)
    }};
}

/// Uploads a plain-text material and evaluates to its id.
macro_rules! upload_material {
    ($app:expr, $token:expr, $text:expr) => {
        upload_material!($app, $token, $text, None::<&str>)
    };
    ($app:expr, $token:expr, $text:expr, $course:expr) => {{
        let mut form = test_support::MultipartBody::new().text("title", "Cell biology");
        if let Some(course) = $course {
            form = form.text("courseId", course);
        }
        let (content_type, body) = form
            .file("cells.txt", "text/plain", $text.as_bytes())
            .finish();
        let (status, body) = send!(
            $app,
            actix_web::test::TestRequest::post()
                .uri("/api/v1/materials")
                .insert_header(test_support::bearer(&$token))
                .insert_header(("Content-Type", content_type))
                .set_payload(body)
        );
        assert_eq!(status, actix_web::http::StatusCode::CREATED, "{}", body);
        body["id"].as_str().expect("material id").to_string()
    }};
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

/// Temp database and upload dir, bcrypt at its cheapest cost.
pub fn test_state(assistant: Arc<dyn Assistant>) -> (TempDir, web::Data<AppState>) {
    test_state_with(assistant, |_| {})
}

pub fn test_state_with(
    assistant: Arc<dyn Assistant>,
    tweak: impl FnOnce(&mut AppConfig),
) -> (TempDir, web::Data<AppState>) {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = AppConfig {
        database_path: dir.path().join("edustream.sqlite"),
        upload_dir: dir.path().join("uploads"),
        password_cost: 4,
        quiz_timeout_secs: 1,
        public_base_url: "http://edu.test".to_string(),
        ..AppConfig::default()
    };
    tweak(&mut config);
    db::init(&config.database_path).expect("init db");
    (dir, web::Data::new(AppState::new(config, assistant)))
}

pub fn disabled() -> Arc<dyn Assistant> {
    Arc::new(DisabledAssistant)
}

/// Assistant with canned answers. `None` makes the matching call fail.
#[derive(Default)]
pub struct ScriptedAssistant {
    pub grade: Option<u8>,
    pub ocr_text: Option<String>,
    pub detailed_quiz: Option<Vec<Value>>,
    pub basic_quiz: Option<Vec<Value>>,
    /// Applied before every quiz reply.
    pub quiz_delay: Option<Duration>,
}

impl Assistant for ScriptedAssistant {
    fn grade_assignment<'a>(&'a self, _: &'a str, _: &'a str) -> AssistantFuture<'a, AutoGrade> {
        async move {
            self.grade
                .map(|score| AutoGrade {
                    score,
                    feedback: "Well structured answer".to_string(),
                })
                .ok_or_else(|| AssistantError::Malformed("scripted failure".to_string()))
        }
        .boxed()
    }

    fn recognize_image<'a>(&'a self, _: &'a [u8], _: &'a str) -> AssistantFuture<'a, String> {
        async move {
            self.ocr_text
                .clone()
                .ok_or_else(|| AssistantError::Malformed("scripted failure".to_string()))
        }
        .boxed()
    }

    fn generate_quiz<'a>(
        &'a self,
        _: &'a QuizPrompt<'a>,
        detailed: bool,
    ) -> AssistantFuture<'a, Vec<Value>> {
        async move {
            if let Some(delay) = self.quiz_delay {
                tokio::time::sleep(delay).await;
            }
            let reply = if detailed {
                &self.detailed_quiz
            } else {
                &self.basic_quiz
            };
            reply
                .clone()
                .ok_or_else(|| AssistantError::Malformed("scripted failure".to_string()))
        }
        .boxed()
    }
}

/// Hand-rolled `multipart/form-data` body.
pub struct MultipartBody {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        MultipartBody {
            boundary: "edustream-test-boundary".to_string(),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, file_name, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// `(content type header value, body)`.
    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }
}
