use axum::http::StatusCode;
use invitecard_shared::store::UserStore;
use invitecard_shared::test_utils::http_test_utils::{
    create_test_request, response_to_json, test_auth_keys,
};
use serde_json::json;
use tower::ServiceExt;

use super::{admin, create_test_app, jane};

#[tokio::test]
async fn login_with_known_email_returns_token() {
    let (app, state) = create_test_app();

    let response = app
        .oneshot(create_test_request(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": "  Jane@Example.com " })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_to_json(response).await;
    assert_eq!(body["user"]["id"], "3");
    assert!(body["user"]["lastLogin"].is_string());

    let claims = test_auth_keys()
        .verify(body["token"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.sub, "3");
    assert!(!claims.is_admin());

    let stored = state.store.get_user("3").await.unwrap();
    assert!(stored.last_login.is_some());
}

#[tokio::test]
async fn login_with_unknown_email_is_rejected() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(create_test_request(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": "nobody@example.com" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response_to_json(response).await;
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn login_without_email_is_a_bad_request() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(create_test_request(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": "   " })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn me_returns_the_signed_in_user() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(create_test_request("GET", "/me", Some(&jane()), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_to_json(response).await;
    assert_eq!(body["user"]["email"], "jane@example.com");
}

#[tokio::test]
async fn missing_or_bad_token_is_unauthorized() {
    let (app, _) = create_test_app();

    let response = app
        .clone()
        .oneshot(create_test_request("GET", "/me", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = http::Request::builder()
        .uri("/me")
        .header("Authorization", "Bearer not-a-token")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_routes_reject_regular_users() {
    let (app, _) = create_test_app();

    let response = app
        .clone()
        .oneshot(create_test_request("GET", "/users", Some(&jane()), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(create_test_request("GET", "/users", Some(&admin()), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(create_test_request("GET", "/nowhere", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn demoted_admin_loses_access_with_an_old_token() {
    let (app, _) = create_test_app();

    let response = app
        .clone()
        .oneshot(create_test_request(
            "PATCH",
            "/users/1",
            Some(&admin()),
            Some(json!({ "accessLevel": "user" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Same token as before, still carrying accessLevel=admin
    let response = app
        .oneshot(create_test_request("GET", "/users", Some(&admin()), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
