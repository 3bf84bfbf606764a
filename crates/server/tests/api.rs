//! End-to-end tests over the router, sqlite in memory.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::Engine as _;
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use tower::ServiceExt;

async fn setup() -> Router {
    let db: DatabaseConnection = Database::connect("sqlite::memory:")
        .await
        .expect("connect in-memory sqlite");
    migration::Migrator::up(&db, None).await.expect("migrate");

    for (username, password, role) in [
        ("root", "toor", "admin"),
        ("alice", "wonder", "student"),
        ("marta", "hunter2", "mentor"),
    ] {
        db.execute(Statement::from_sql_and_values(
            db.get_database_backend(),
            "INSERT INTO users (username, password, role) VALUES (?, ?, ?)",
            [username.into(), password.into(), role.into()],
        ))
        .await
        .expect("seed user");
    }

    let engine = engine::Engine::builder().database(db.clone()).build();
    server::app(engine, db)
}

fn basic_auth(username: &str, password: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
    format!("Basic {encoded}")
}

fn authed_json(
    method: &str,
    uri: &str,
    username: &str,
    password: &str,
    body: serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, basic_auth(username, password))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request")
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn rejects_missing_credentials() {
    let app = setup().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/courses")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({"title": "Rust", "price_minor": 50_000}).to_string(),
                ))
                .expect("build request"),
        )
        .await
        .expect("send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn rejects_wrong_password() {
    let app = setup().await;

    let response = app
        .oneshot(authed_json(
            "POST",
            "/courses",
            "root",
            "wrong",
            serde_json::json!({"title": "Rust", "price_minor": 50_000}),
        ))
        .await
        .expect("send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn student_cannot_create_courses() {
    let app = setup().await;

    let response = app
        .oneshot(authed_json(
            "POST",
            "/courses",
            "alice",
            "wonder",
            serde_json::json!({"title": "Rust", "price_minor": 50_000}),
        ))
        .await
        .expect("send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn capture_callback_is_admin_only() {
    let app = setup().await;

    let response = app
        .clone()
        .oneshot(authed_json(
            "POST",
            "/courses",
            "root",
            "toor",
            serde_json::json!({"title": "Rust", "price_minor": 50_000}),
        ))
        .await
        .expect("create course");
    let course = json_body(response).await;

    let response = app
        .clone()
        .oneshot(authed_json(
            "POST",
            "/enrollments",
            "root",
            "toor",
            serde_json::json!({
                "student_id": "alice",
                "course_id": course["id"],
                "start_date": "2026-08-01T00:00:00Z",
                "end_date": null,
            }),
        ))
        .await
        .expect("create enrollment");
    let enrollment = json_body(response).await;

    let response = app
        .clone()
        .oneshot(authed_json(
            "POST",
            "/payments",
            "root",
            "toor",
            serde_json::json!({
                "enrollment_id": enrollment["id"],
                "amount_minor": 50_000,
                "payer_id": "alice",
                "assignment_id": null,
                "gateway_reference": "gw-77",
            }),
        ))
        .await
        .expect("record pending payment");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(authed_json(
            "POST",
            "/payments/capture",
            "alice",
            "wonder",
            serde_json::json!({"payment_id": null, "gateway_reference": "gw-77", "succeeded": true}),
        ))
        .await
        .expect("capture as student");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(authed_json(
            "POST",
            "/payments/capture",
            "root",
            "toor",
            serde_json::json!({"payment_id": null, "gateway_reference": "gw-77", "succeeded": true}),
        ))
        .await
        .expect("capture as admin");
    assert_eq!(response.status(), StatusCode::OK);
    let payment = json_body(response).await;
    assert_eq!(payment["status"], "completed");
}

#[tokio::test]
async fn course_enrollment_payment_flow() {
    let app = setup().await;

    let response = app
        .clone()
        .oneshot(authed_json(
            "POST",
            "/courses",
            "root",
            "toor",
            serde_json::json!({"title": "Rust for mentors", "price_minor": 50_000}),
        ))
        .await
        .expect("create course");
    assert_eq!(response.status(), StatusCode::CREATED);
    let course = json_body(response).await;
    let course_id = course["id"].as_str().expect("course id").to_string();

    let response = app
        .clone()
        .oneshot(authed_json(
            "POST",
            "/enrollments",
            "root",
            "toor",
            serde_json::json!({
                "student_id": "alice",
                "course_id": course_id,
                "start_date": "2026-08-01T00:00:00Z",
                "end_date": null,
            }),
        ))
        .await
        .expect("create enrollment");
    assert_eq!(response.status(), StatusCode::CREATED);
    let enrollment = json_body(response).await;
    assert_eq!(enrollment["total_amount_minor"], 50_000);
    let enrollment_id = enrollment["id"].as_str().expect("enrollment id").to_string();

    let response = app
        .clone()
        .oneshot(authed_json(
            "POST",
            "/payments",
            "root",
            "toor",
            serde_json::json!({
                "enrollment_id": enrollment_id,
                "amount_minor": 20_000,
                "payer_id": "alice",
                "assignment_id": null,
                "gateway_reference": null,
            }),
        ))
        .await
        .expect("record payment");
    assert_eq!(response.status(), StatusCode::CREATED);
    let payment = json_body(response).await;
    assert_eq!(payment["status"], "completed");
    assert_eq!(payment["mentor_commission_minor"], 7_400);
    assert_eq!(payment["platform_fee_minor"], 600);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/enrollments/{enrollment_id}"))
                .header(header::AUTHORIZATION, basic_auth("alice", "wonder"))
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("get enrollment detail");
    assert_eq!(response.status(), StatusCode::OK);
    let detail = json_body(response).await;
    assert_eq!(detail["enrollment"]["paid_amount_minor"], 20_000);
    assert_eq!(detail["enrollment"]["status"], "active");
    assert_eq!(detail["payments"].as_array().map(Vec::len), Some(1));
}
