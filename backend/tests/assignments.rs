#[macro_use]
mod test_support;

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use chrono::{Duration, Utc};
use serde_json::json;
use std::sync::Arc;
use test_support::{bearer, disabled, test_state, test_state_with, MultipartBody, ScriptedAssistant};

/// Shares a fresh material and evaluates to the short code.
macro_rules! material_link {
    ($app:expr, $token:expr) => {{
        let material = upload_material!($app, $token, "Write a short essay about photosynthesis.");
        let (status, link) = send!(
            $app,
            TestRequest::post()
                .uri("/api/v1/share/create")
                .insert_header(bearer(&$token))
                .set_json(json!({"resourceId": material, "resourceType": "material"}))
        );
        assert_eq!(status, StatusCode::CREATED);
        link["shortCode"].as_str().expect("short code").to_string()
    }};
}

fn upload(code: &str, form: MultipartBody) -> TestRequest {
    let (content_type, body) = form.finish();
    TestRequest::post()
        .uri(&format!("/api/v1/share/{}/upload", code))
        .insert_header(("Content-Type", content_type))
        .set_payload(body)
}

#[actix_web::test]
async fn second_upload_for_the_same_student_conflicts() {
    let (_dir, state) = test_state(disabled());
    let app = init_app!(state);
    let token = register_teacher!(app, "teacher@school.test");
    let code = material_link!(app, token);

    let first = MultipartBody::new()
        .text("studentName", "Alice")
        .file("essay.txt", "text/plain", b"Plants turn light into sugar.");
    let (status, receipt) = send!(app, upload(&code, first));
    assert_eq!(status, StatusCode::OK, "{}", receipt);
    assert_eq!(receipt["status"], "pending");
    assert_eq!(receipt["studentName"], "Alice");
    assert!(receipt["score"].is_null());

    let again = MultipartBody::new()
        .text("studentName", "  alice ")
        .text("responseText", "Second try");
    let (status, body) = send!(app, upload(&code, again));
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 409);

    let (status, queue) = send!(
        app,
        TestRequest::get()
            .uri("/api/v1/ocr/queue")
            .insert_header(bearer(&token))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(queue["total"], 1);
    assert_eq!(queue["queue"][0]["filename"], "essay.txt");
}

#[actix_web::test]
async fn invalid_uploads_are_rejected_before_anything_is_stored() {
    let (dir, state) = test_state_with(disabled(), |config| config.max_upload_bytes = 64);
    let app = init_app!(state);
    let token = register_teacher!(app, "teacher@school.test");
    let code = material_link!(app, token);

    let cases = vec![
        MultipartBody::new()
            .text("studentName", "Bob")
            .file("virus.exe", "application/octet-stream", b"MZ"),
        MultipartBody::new()
            .text("studentName", "Bob")
            .file("big.txt", "text/plain", &[b'a'; 65]),
        MultipartBody::new().file("essay.txt", "text/plain", b"no name"),
        MultipartBody::new().text("studentName", "   ").text("responseText", "hi"),
        MultipartBody::new().text("studentName", "Bob"),
    ];
    for form in cases {
        let (status, body) = send!(app, upload(&code, form));
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    }

    let conn = state.db().expect("db");
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM assignment_submissions", [], |row| row.get(0))
        .expect("count");
    assert_eq!(rows, 0);
    // Only the shared material's own file is on disk.
    let stored = std::fs::read_dir(dir.path().join("uploads")).expect("uploads").count();
    assert_eq!(stored, 1);
}

#[actix_web::test]
async fn expired_link_is_gone_before_the_file_is_checked() {
    let (_dir, state) = test_state(disabled());
    let app = init_app!(state);
    let token = register_teacher!(app, "teacher@school.test");
    let material = upload_material!(app, token, "Write a short essay.");
    let (status, link) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/share/create")
            .insert_header(bearer(&token))
            .set_json(json!({
                "resourceId": material,
                "resourceType": "material",
                "expiresAt": Utc::now() - Duration::seconds(1),
            }))
    );
    assert_eq!(status, StatusCode::CREATED, "{}", link);
    let code = link["shortCode"].as_str().expect("short code");

    let form = MultipartBody::new()
        .text("studentName", "Bob")
        .file("virus.exe", "application/octet-stream", b"MZ");
    let (status, body) = send!(app, upload(code, form));
    assert_eq!(status, StatusCode::GONE, "{}", body);
    assert_eq!(body["code"], 410);
}

#[actix_web::test]
async fn uploads_need_a_material_link() {
    let (_dir, state) = test_state(disabled());
    let app = init_app!(state);
    let token = register_teacher!(app, "teacher@school.test");
    let material = upload_material!(app, token, "Text");
    let (_, quiz) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/quizzes")
            .insert_header(bearer(&token))
            .set_json(json!({
                "materialId": material,
                "questions": [{"text": "1 + 1?", "correctAnswer": "2"}]
            }))
    );
    let (_, link) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/share/create")
            .insert_header(bearer(&token))
            .set_json(json!({"resourceId": quiz["id"], "resourceType": "quiz"}))
    );
    let code = link["shortCode"].as_str().expect("short code");

    let form = MultipartBody::new()
        .text("studentName", "Bob")
        .text("responseText", "2");
    let (status, _) = send!(app, upload(code, form));
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let form = MultipartBody::new().text("studentName", "Bob");
    let (status, _) = send!(app, upload("Missing1", form));
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn auto_grade_is_provisional_and_reviewable() {
    let assistant = ScriptedAssistant {
        grade: Some(15),
        ocr_text: Some("Chlorophyll absorbs light".to_string()),
        ..ScriptedAssistant::default()
    };
    let (_dir, state) = test_state(Arc::new(assistant));
    let app = init_app!(state);
    let token = register_teacher!(app, "teacher@school.test");
    let code = material_link!(app, token);

    let form = MultipartBody::new()
        .text("studentName", "Carol")
        .text("responseText", "Plants make sugar.")
        .file("page.png", "image/png", b"\x89PNG fake");
    let (status, receipt) = send!(app, upload(&code, form));
    assert_eq!(status, StatusCode::OK, "{}", receipt);
    assert_eq!(receipt["status"], "pending");
    assert_eq!(receipt["score"], 75);
    assert_eq!(receipt["feedback"], "Well structured answer");
    let id = receipt["submissionId"].as_str().expect("id").to_string();

    let (status, detail) = send!(
        app,
        TestRequest::get()
            .uri(&format!("/api/v1/ocr/results/{}", id))
            .insert_header(bearer(&token))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["student"]["accuracy"], 75);
    let regions = detail["questions"].as_array().expect("regions");
    assert_eq!(regions.len(), 2);
    assert_eq!(regions[1]["recognizedText"], "Chlorophyll absorbs light");
    assert_eq!(regions[1]["confidence"], "Low");

    let (status, _) = send!(
        app,
        TestRequest::patch()
            .uri(&format!("/api/v1/ocr/results/{}", id))
            .insert_header(bearer(&token))
            .set_json(json!({"manualScore": 150}))
    );
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, detail) = send!(
        app,
        TestRequest::patch()
            .uri(&format!("/api/v1/ocr/results/{}", id))
            .insert_header(bearer(&token))
            .set_json(json!({"manualScore": 90, "correctedText": {"file": "Chlorophyll absorbs sunlight"}}))
    );
    assert_eq!(status, StatusCode::OK, "{}", detail);
    assert_eq!(detail["status"], "reviewed");
    assert_eq!(detail["manualScore"], 90);
    assert_eq!(detail["questions"][1]["recognizedText"], "Chlorophyll absorbs sunlight");
    assert_eq!(detail["questions"][1]["confidence"], "High");

    let other = register_teacher!(app, "other@school.test");
    let (status, _) = send!(
        app,
        TestRequest::get()
            .uri(&format!("/api/v1/ocr/results/{}", id))
            .insert_header(bearer(&other))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn grader_failure_still_records_the_submission() {
    let (_dir, state) = test_state(Arc::new(ScriptedAssistant::default()));
    let app = init_app!(state);
    let token = register_teacher!(app, "teacher@school.test");
    let code = material_link!(app, token);

    let form = MultipartBody::new()
        .text("studentName", "Dan")
        .text("responseText", "An answer");
    let (status, receipt) = send!(app, upload(&code, form));
    assert_eq!(status, StatusCode::OK, "{}", receipt);
    assert_eq!(receipt["status"], "pending");
    assert!(receipt["score"].is_null());
    assert!(receipt["feedback"].is_null());
}

#[actix_web::test]
async fn batch_approve_reports_partial_success() {
    let (_dir, state) = test_state(disabled());
    let app = init_app!(state);
    let token = register_teacher!(app, "teacher@school.test");
    let code = material_link!(app, token);

    let mut ids = Vec::new();
    for name in ["Eve", "Frank"] {
        let form = MultipartBody::new()
            .text("studentName", name)
            .text("responseText", "My answer");
        let (_, receipt) = send!(app, upload(&code, form));
        ids.push(receipt["submissionId"].as_str().expect("id").to_string());
    }
    ids.push("00000000-0000-0000-0000-000000000000".to_string());
    ids.push("garbage".to_string());

    let (status, body) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/ocr/batch-approve")
            .insert_header(bearer(&token))
            .set_json(json!({"ids": ids}))
    );
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["status"], "partial");
    assert_eq!(body["approved"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["approved"][0]["status"], "graded");
    assert_eq!(body["approved"][0]["lowConfidenceWarnings"], 0);
    assert_eq!(body["errors"].as_array().map(Vec::len), Some(2));

    let (_, queue) = send!(
        app,
        TestRequest::get()
            .uri("/api/v1/ocr/queue")
            .insert_header(bearer(&token))
    );
    assert_eq!(queue["total"], 0);
}
