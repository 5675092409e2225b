//! Integration tests for the profile directory API
//!
//! Drives the full router: multipart submission, lookup, listing, and
//! delete, asserting on status codes, response shape, and store state.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tower::util::ServiceExt;

use medidir_pd::assets::AssetStore;
use medidir_pd::{build_router, AppState};

const BOUNDARY: &str = "medidir-test-boundary";

/// Test helper: build the app over a temp-dir database and uploads folder
async fn create_test_app() -> (axum::Router, sqlx::SqlitePool, tempfile::TempDir) {
    let temp = tempfile::tempdir().expect("Failed to create temp dir");

    let pool = medidir_common::db::init_database(&temp.path().join("medidir.db"))
        .await
        .expect("Failed to initialize database");
    let assets =
        AssetStore::new(temp.path().join("uploads")).expect("Failed to open asset store");

    let state = AppState::new(pool.clone(), assets);
    (build_router(state), pool, temp)
}

/// Test helper: encode a multipart submission body
fn multipart_body(fields: &[(&str, &str)], photo: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, content_type, bytes)) = photo {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn post_profile(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/profile")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn alice_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("name", "Alice"),
        ("age", "30"),
        ("gender", "F"),
        ("bloodGroup", "O+"),
        ("dateOfBirth", "1994-01-01"),
    ]
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let (app, _pool, _temp) = create_test_app().await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "medidir-pd");
}

#[tokio::test]
async fn create_fetch_delete_roundtrip() {
    let (app, _pool, _temp) = create_test_app().await;

    // Create without a photo
    let response = app
        .clone()
        .oneshot(post_profile(multipart_body(&alice_fields(), None)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["record"]["name"], "Alice");
    assert_eq!(json["record"]["bloodGroup"], "O+");
    assert!(json["record"]["photoPath"].is_null());

    // Fetch by exact name
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/profile/name/Alice")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["record"]["dateOfBirth"], "1994-01-01");
    assert!(json["record"]["photoPath"].is_null());

    // Delete
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/profile/name/Alice")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Subsequent fetch is a 404
    let response = app
        .oneshot(
            Request::builder()
                .uri("/profile/name/Alice")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn fetch_unknown_name_is_404() {
    let (app, _pool, _temp) = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/profile/name/Nobody")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = response_json(response).await;
    assert_eq!(json["success"], false);
    assert!(json.get("record").is_none());
}

#[tokio::test]
async fn delete_unknown_name_is_404_with_no_side_effects() {
    let (app, pool, _temp) = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/profile/name/Nobody")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn missing_required_fields_are_rejected_with_zero_writes() {
    let (app, pool, temp) = create_test_app().await;

    // Omit bloodGroup and dateOfBirth, but attach a photo: neither store
    // may be written.
    let body = multipart_body(
        &[("name", "Alice"), ("age", "30"), ("gender", "F")],
        Some(("selfie.png", "image/png", b"png bytes")),
    );
    let response = app.oneshot(post_profile(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert_eq!(json["success"], false);
    let message = json["message"].as_str().unwrap();
    assert!(message.contains("bloodGroup"));
    assert!(message.contains("dateOfBirth"));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
    assert_eq!(
        std::fs::read_dir(temp.path().join("uploads")).unwrap().count(),
        0
    );
}

#[tokio::test]
async fn resubmission_updates_in_place() {
    let (app, pool, _temp) = create_test_app().await;

    let response = app
        .clone()
        .oneshot(post_profile(multipart_body(&alice_fields(), None)))
        .await
        .unwrap();
    let first = response_json(response).await;

    // Identical payload again: same fields, only updatedAt may differ
    let response = app
        .clone()
        .oneshot(post_profile(multipart_body(&alice_fields(), None)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let second = response_json(response).await;

    assert_eq!(first["record"]["name"], second["record"]["name"]);
    assert_eq!(first["record"]["age"], second["record"]["age"]);
    assert_eq!(first["record"]["createdAt"], second["record"]["createdAt"]);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);

    // Changed field wins on a later submission
    let mut fields = alice_fields();
    fields[1] = ("age", "31");
    let response = app
        .oneshot(post_profile(multipart_body(&fields, None)))
        .await
        .unwrap();
    let third = response_json(response).await;
    assert_eq!(third["record"]["age"], "31");
    assert_eq!(third["record"]["createdAt"], first["record"]["createdAt"]);
}

#[tokio::test]
async fn optional_fields_survive_an_update_that_omits_them() {
    let (app, _pool, _temp) = create_test_app().await;

    let mut fields = alice_fields();
    fields.push(("medicalConditions", "asthma"));
    let response = app
        .clone()
        .oneshot(post_profile(multipart_body(&fields, None)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(post_profile(multipart_body(&alice_fields(), None)))
        .await
        .unwrap();
    let json = response_json(response).await;
    assert_eq!(json["record"]["medicalConditions"], "asthma");
}

#[tokio::test]
async fn listing_returns_every_profile() {
    let (app, _pool, _temp) = create_test_app().await;

    // Empty directory lists as an empty array
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/profiles").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["records"].as_array().unwrap().len(), 0);

    app.clone()
        .oneshot(post_profile(multipart_body(&alice_fields(), None)))
        .await
        .unwrap();
    let bob = vec![
        ("name", "Bob"),
        ("age", "40"),
        ("gender", "M"),
        ("bloodGroup", "A-"),
        ("dateOfBirth", "1984-06-15"),
    ];
    app.clone()
        .oneshot(post_profile(multipart_body(&bob, None)))
        .await
        .unwrap();

    let response = app
        .oneshot(Request::builder().uri("/profiles").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = response_json(response).await;
    let records = json["records"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["name"], "Alice");
    assert_eq!(records[1]["name"], "Bob");
}

#[tokio::test]
async fn names_are_case_sensitive() {
    let (app, _pool, _temp) = create_test_app().await;

    app.clone()
        .oneshot(post_profile(multipart_body(&alice_fields(), None)))
        .await
        .unwrap();

    let lower = vec![
        ("name", "alice"),
        ("age", "60"),
        ("gender", "F"),
        ("bloodGroup", "B+"),
        ("dateOfBirth", "1964-01-01"),
    ];
    app.clone()
        .oneshot(post_profile(multipart_body(&lower, None)))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/profile/name/alice")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = response_json(response).await;
    assert_eq!(json["record"]["age"], "60");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/profile/name/Alice")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = response_json(response).await;
    assert_eq!(json["record"]["age"], "30");
}
