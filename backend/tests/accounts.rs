#[macro_use]
mod test_support;

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use serde_json::json;
use test_support::{bearer, disabled, test_state};

#[actix_web::test]
async fn register_login_and_me() {
    let (_dir, state) = test_state(disabled());
    let app = init_app!(state);

    let (status, registered) = send!(
        app,
        TestRequest::post().uri("/api/v1/auth/register").set_json(json!({
            "email": "  Ada@School.TEST ",
            "password": "correct horse battery",
            "displayName": "Ada"
        }))
    );
    assert_eq!(status, StatusCode::CREATED, "{}", registered);
    assert_eq!(registered["teacher"]["email"], "ada@school.test");
    assert_eq!(registered["token"].as_str().map(str::len), Some(40));

    let (status, _) = send!(
        app,
        TestRequest::post().uri("/api/v1/auth/register").set_json(json!({
            "email": "ada@school.test",
            "password": "another password"
        }))
    );
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send!(
        app,
        TestRequest::post().uri("/api/v1/auth/register").set_json(json!({
            "email": "bob@school.test",
            "password": "short"
        }))
    );
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send!(
        app,
        TestRequest::post().uri("/api/v1/auth/login").set_json(json!({
            "email": "ada@school.test",
            "password": "wrong password"
        }))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, login) = send!(
        app,
        TestRequest::post().uri("/api/v1/auth/login").set_json(json!({
            "email": "ADA@school.test",
            "password": "correct horse battery"
        }))
    );
    assert_eq!(status, StatusCode::OK);
    let token = login["token"].as_str().expect("token");

    let (status, me) = send!(app, TestRequest::get().uri("/api/v1/auth/me").insert_header(bearer(token)));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["displayName"], "Ada");

    let (status, body) = send!(app, TestRequest::get().uri("/api/v1/auth/me"));
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 401);
    let (status, _) = send!(
        app,
        TestRequest::get().uri("/api/v1/auth/me").insert_header(bearer("bogus"))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn malformed_json_is_unprocessable() {
    let (_dir, state) = test_state(disabled());
    let app = init_app!(state);
    let (status, body) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/auth/login")
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{not json")
    );
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], 422);
}

#[actix_web::test]
async fn deleting_a_course_detaches_its_materials() {
    let (_dir, state) = test_state(disabled());
    let app = init_app!(state);
    let token = register_teacher!(app, "teacher@school.test");

    let (status, _) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/courses")
            .insert_header(bearer(&token))
            .set_json(json!({"title": "   "}))
    );
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, course) = send!(
        app,
        TestRequest::post()
            .uri("/api/v1/courses")
            .insert_header(bearer(&token))
            .set_json(json!({"title": "Biology", "description": "Year 9"}))
    );
    assert_eq!(status, StatusCode::CREATED);
    let course_id = course["id"].as_str().expect("course id").to_string();

    let material = upload_material!(app, token, "Cells", Some(course_id.as_str()));

    let (_, courses) = send!(
        app,
        TestRequest::get().uri("/api/v1/courses").insert_header(bearer(&token))
    );
    assert_eq!(courses[0]["materialsCount"], 1);

    let (_, listed) = send!(
        app,
        TestRequest::get()
            .uri(&format!("/api/v1/materials?courseId={}", course_id))
            .insert_header(bearer(&token))
    );
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    let other = register_teacher!(app, "other@school.test");
    let (status, _) = send!(
        app,
        TestRequest::delete()
            .uri(&format!("/api/v1/courses/{}", course_id))
            .insert_header(bearer(&other))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send!(
        app,
        TestRequest::delete()
            .uri(&format!("/api/v1/courses/{}", course_id))
            .insert_header(bearer(&token))
    );
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, kept) = send!(
        app,
        TestRequest::get()
            .uri(&format!("/api/v1/materials/{}", material))
            .insert_header(bearer(&token))
    );
    assert_eq!(status, StatusCode::OK);
    assert!(kept["courseId"].is_null());
    assert_eq!(kept["content"], "Cells");

    let (_, courses) = send!(
        app,
        TestRequest::get().uri("/api/v1/courses").insert_header(bearer(&token))
    );
    assert_eq!(courses.as_array().map(Vec::len), Some(0));
}

#[actix_web::test]
async fn health_needs_no_token() {
    let (_dir, state) = test_state(disabled());
    let app = init_app!(state);
    let (status, body) = send!(app, TestRequest::get().uri("/api/v1/health"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
