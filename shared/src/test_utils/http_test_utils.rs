use axum::{
    body::{Body, Bytes},
    response::Response,
};
use chrono::Duration;
use http::{header, Request};
use http_body_util::BodyExt;
use serde_json::Value;

use crate::auth::AuthKeys;
use crate::models::User;

/// Secret every test router is built with.
pub const TEST_JWT_SECRET: &[u8] = b"test-jwt-secret";

pub fn test_auth_keys() -> AuthKeys {
    AuthKeys::new(TEST_JWT_SECRET)
}

pub fn bearer_for(user: &User) -> String {
    let token = test_auth_keys()
        .issue_token(user, Duration::hours(1))
        .expect("issue test token");
    format!("Bearer {}", token)
}

/// Builds a JSON request, authenticated as `user` when one is given.
pub fn create_test_request(
    method: &str,
    path: &str,
    user: Option<&User>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(user) = user {
        builder = builder.header(header::AUTHORIZATION, bearer_for(user));
    }

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("build test request"),
        None => builder.body(Body::empty()).expect("build test request"),
    }
}

/// Builds a request carrying raw bytes, e.g. an uploaded camera frame.
pub fn create_bytes_request(
    method: &str,
    path: &str,
    user: Option<&User>,
    content_type: &str,
    bytes: Vec<u8>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, content_type);
    if let Some(user) = user {
        builder = builder.header(header::AUTHORIZATION, bearer_for(user));
    }
    builder.body(Body::from(bytes)).expect("build test request")
}

pub async fn response_to_bytes(response: Response) -> Bytes {
    response
        .into_body()
        .collect()
        .await
        .expect("read response body")
        .to_bytes()
}

pub async fn response_to_json(response: Response) -> Value {
    let bytes = response_to_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}
