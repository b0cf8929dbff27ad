use axum::http::StatusCode;
use invitecard_shared::store::UserStore;
use invitecard_shared::test_utils::http_test_utils::{create_test_request, response_to_json};
use serde_json::json;
use tower::ServiceExt;

use super::{admin, create_test_app};

#[tokio::test]
async fn list_users_returns_demo_users() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(create_test_request("GET", "/users", Some(&admin()), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_to_json(response).await;
    assert_eq!(body["users"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn create_user_applies_defaults() {
    let (app, state) = create_test_app();

    let response = app
        .oneshot(create_test_request(
            "POST",
            "/users",
            Some(&admin()),
            Some(json!({
                "name": "Priya Nair",
                "email": "Priya@Example.com",
                "companyId": "COMP009",
                "roomNumber": "310",
                "attendeeInfo": {
                    "type": "couple",
                    "attendees": [{ "name": "Arjun Nair", "phone": "555-0101" }]
                }
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_to_json(response).await;
    assert_eq!(body["email"], "priya@example.com");
    assert_eq!(body["accessLevel"], "user");
    assert_eq!(body["attendeeInfo"]["type"], "couple");
    assert!(body["lastLogin"].is_null());

    let id = body["id"].as_str().unwrap();
    let stored = state.store.get_user(id).await.unwrap();
    assert_eq!(stored.room_number, "310");
}

#[tokio::test]
async fn create_user_with_taken_email_conflicts() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(create_test_request(
            "POST",
            "/users",
            Some(&admin()),
            Some(json!({ "name": "Another John", "email": "JOHN@example.com" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn create_user_requires_name_and_email() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(create_test_request(
            "POST",
            "/users",
            Some(&admin()),
            Some(json!({ "name": "", "email": "someone@example.com" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_missing_user_is_not_found() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(create_test_request("GET", "/users/404", Some(&admin()), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn patch_sets_and_clears_optional_fields() {
    let (app, state) = create_test_app();

    let response = app
        .clone()
        .oneshot(create_test_request(
            "PATCH",
            "/users/3",
            Some(&admin()),
            Some(json!({ "state": "Kerala", "roomNumber": "205" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(create_test_request(
            "PATCH",
            "/users/3",
            Some(&admin()),
            Some(json!({ "designation": null })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let jane = state.store.get_user("3").await.unwrap();
    assert_eq!(jane.state.as_deref(), Some("Kerala"));
    assert_eq!(jane.room_number, "205");
    assert_eq!(jane.designation, None);
    assert_eq!(jane.name, "Jane Smith");
}

#[tokio::test]
async fn delete_user_removes_them() {
    let (app, state) = create_test_app();

    let response = app
        .oneshot(create_test_request("DELETE", "/users/2", Some(&admin()), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_to_json(response).await;
    assert_eq!(body["message"], "User deleted successfully");
    assert!(state.store.get_user("2").await.is_err());
}

#[tokio::test]
async fn admin_cannot_delete_themselves() {
    let (app, state) = create_test_app();

    let response = app
        .oneshot(create_test_request("DELETE", "/users/1", Some(&admin()), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(state.store.get_user("1").await.is_ok());
}

#[tokio::test]
async fn import_creates_and_updates_users() {
    let (app, state) = create_test_app();

    let response = app
        .oneshot(create_test_request(
            "POST",
            "/users/import",
            Some(&admin()),
            Some(json!({
                "users": [
                    { "name": "John Doe", "email": "john@example.com", "roomNumber": "111" },
                    { "name": "Meera Iyer", "email": "meera@example.com", "state": "Goa" }
                ]
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_to_json(response).await;
    assert_eq!(body["created"], 1);
    assert_eq!(body["updated"], 1);
    assert_eq!(body["users"].as_array().unwrap().len(), 4);

    let john = state.store.get_user("2").await.unwrap();
    assert_eq!(john.room_number, "111");
    assert_eq!(john.company_id, "COMP001");
}

#[tokio::test]
async fn import_with_invalid_row_writes_nothing() {
    let (app, state) = create_test_app();

    let response = app
        .oneshot(create_test_request(
            "POST",
            "/users/import",
            Some(&admin()),
            Some(json!({
                "users": [
                    { "name": "Meera Iyer", "email": "meera@example.com" },
                    { "name": "No Email" }
                ]
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_to_json(response).await;
    assert_eq!(body["error"], "Row 2: email and name are required fields");
    assert_eq!(state.store.list_users().await.unwrap().len(), 3);
}

#[tokio::test]
async fn list_users_filters_by_search_query() {
    let (app, _) = create_test_app();

    let response = app
        .clone()
        .oneshot(create_test_request(
            "GET",
            "/users?q=SMITH",
            Some(&admin()),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_to_json(response).await;
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["id"], "3");

    let response = app
        .oneshot(create_test_request(
            "GET",
            "/users?q=comp00",
            Some(&admin()),
            None,
        ))
        .await
        .unwrap();
    let body = response_to_json(response).await;
    assert_eq!(body["users"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn malformed_email_is_rejected_on_create_and_update() {
    let (app, state) = create_test_app();

    let response = app
        .clone()
        .oneshot(create_test_request(
            "POST",
            "/users",
            Some(&admin()),
            Some(json!({ "name": "Priya Nair", "email": "priya-at-example" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_to_json(response).await;
    assert_eq!(body["error"], "Invalid email address");

    let response = app
        .oneshot(create_test_request(
            "PATCH",
            "/users/3",
            Some(&admin()),
            Some(json!({ "email": "jane@" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let jane = state.store.get_user("3").await.unwrap();
    assert_eq!(jane.email, "jane@example.com");
    assert_eq!(state.store.list_users().await.unwrap().len(), 3);
}
