use axum::{http::StatusCode, Router};
use invitecard_shared::qr;
use invitecard_shared::test_utils::http_test_utils::{
    create_bytes_request, create_test_request, response_to_json,
};
use serde_json::Value;
use std::time::Duration;
use tower::ServiceExt;

use super::{admin, create_test_app, jane};

async fn start(app: &Router) -> StatusCode {
    app.clone()
        .oneshot(create_test_request(
            "POST",
            "/scanner/start",
            Some(&admin()),
            None,
        ))
        .await
        .unwrap()
        .status()
}

async fn status(app: &Router) -> Value {
    let response = app
        .clone()
        .oneshot(create_test_request("GET", "/scanner", Some(&admin()), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    response_to_json(response).await
}

async fn wait_for_result(app: &Router) -> Value {
    for _ in 0..300 {
        let body = status(app).await;
        if body["state"] == "idle" && !body["lastResult"].is_null() {
            return body["lastResult"].clone();
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("scan never finished");
}

#[tokio::test]
async fn frame_posted_right_after_start_is_scanned() {
    let (app, state) = create_test_app();

    assert_eq!(start(&app).await, StatusCode::ACCEPTED);
    assert!(state.camera().is_streaming());

    let payload = state.codec.encode(&jane()).unwrap();
    let png = qr::render_png(&payload, 256).unwrap();
    let response = app
        .clone()
        .oneshot(create_bytes_request(
            "POST",
            "/scanner/frames",
            Some(&admin()),
            "image/png",
            png,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let result = wait_for_result(&app).await;
    assert_eq!(result["outcome"], "found");
    assert_eq!(result["user"]["email"], "jane@example.com");
    assert!(!state.camera().is_streaming());
}

#[tokio::test]
async fn second_start_conflicts() {
    let (app, state) = create_test_app();

    assert_eq!(start(&app).await, StatusCode::ACCEPTED);
    assert_eq!(start(&app).await, StatusCode::CONFLICT);

    state.scanner.cancel();
    let result = wait_for_result(&app).await;
    assert_eq!(result["outcome"], "cancelled");
}

#[tokio::test]
async fn scan_times_out_without_a_code() {
    let (app, state) = create_test_app();

    assert_eq!(start(&app).await, StatusCode::ACCEPTED);
    assert!(state.camera().is_streaming());

    let result = wait_for_result(&app).await;
    assert_eq!(result["outcome"], "detection_timeout");
    assert!(!state.camera().is_streaming());
}

#[tokio::test]
async fn cancel_stops_the_active_scan() {
    let (app, state) = create_test_app();

    let response = app
        .clone()
        .oneshot(create_test_request("DELETE", "/scanner", Some(&admin()), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    assert_eq!(start(&app).await, StatusCode::ACCEPTED);
    assert!(state.camera().is_streaming());

    let response = app
        .clone()
        .oneshot(create_test_request("DELETE", "/scanner", Some(&admin()), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let result = wait_for_result(&app).await;
    assert_eq!(result["outcome"], "cancelled");
    assert!(!state.camera().is_streaming());
}

#[tokio::test]
async fn frames_are_rejected_while_idle() {
    let (app, _) = create_test_app();
    let png = qr::render_png("anything", 128).unwrap();

    let response = app
        .oneshot(create_bytes_request(
            "POST",
            "/scanner/frames",
            Some(&admin()),
            "image/png",
            png,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn status_starts_idle() {
    let (app, _) = create_test_app();

    let body = status(&app).await;
    assert_eq!(body["state"], "idle");
    assert!(body["lastResult"].is_null());
}
