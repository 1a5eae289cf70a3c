// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! User profile routes: add, look up, customize

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::util::ServiceExt;
use visionaid_node::api::create_router;

use crate::common::{app_state, default_dispatcher};

fn app() -> Router {
    create_router(app_state(default_dispatcher()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn alice() -> Value {
    json!({"name": "Alice", "email": "alice@example.com", "password": "secret"})
}

#[tokio::test]
async fn test_add_then_get_user() {
    let app = app();

    let (status, body) = send(&app, Method::POST, "/add_test_user", Some(alice())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);

    let (status, body) = send(&app, Method::GET, "/get_user_info?email=alice@example.com", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Alice");
    assert_eq!(body["customization"].as_str().unwrap(), "0".repeat(255));
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn test_duplicate_user_conflicts() {
    let app = app();
    send(&app, Method::POST, "/add_test_user", Some(alice())).await;

    let (status, body) = send(&app, Method::POST, "/add_test_user", Some(alice())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Email already exists");
}

#[tokio::test]
async fn test_add_user_missing_fields() {
    let (status, body) = send(
        &app(),
        Method::POST,
        "/add_test_user",
        Some(json!({"name": "Bob", "email": "bob@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing fields");
}

#[tokio::test]
async fn test_update_customization_pads_to_fixed_length() {
    let app = app();
    send(&app, Method::POST, "/add_test_user", Some(alice())).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/update_customization",
        Some(json!({"email": "alice@example.com", "customization": "1101"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Customization updated");

    let (_, body) = send(&app, Method::GET, "/get_user_info?email=alice@example.com", None).await;
    let customization = body["customization"].as_str().unwrap();
    assert_eq!(customization.len(), 255);
    assert!(customization.starts_with("11010"));
}

#[tokio::test]
async fn test_update_unknown_user() {
    let (status, body) = send(
        &app(),
        Method::POST,
        "/update_customization",
        Some(json!({"email": "ghost@example.com", "customization": "1"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn test_missing_parameters() {
    let app = app();

    let (status, _) = send(&app, Method::GET, "/get_user_info", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/update_customization",
        Some(json!({"email": "alice@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, "/get_user_info?email=nobody@example.com", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
