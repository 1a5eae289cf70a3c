// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`
use visionaid_node::api::{create_router, HealthResponse};

use crate::common::{app_state, default_dispatcher, dispatcher, FakeObjects, FakeScenes, FakeText};

#[tokio::test]
async fn test_health_lists_models_and_languages() {
    let state = app_state(dispatcher(
        Arc::new(FakeObjects::default()),
        Arc::new(FakeScenes::new(0)),
        Arc::new(FakeText::new(&["en", "es"], "")),
    ));
    let app = create_router(state);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let health: HealthResponse = serde_json::from_slice(&body).unwrap();

    assert_eq!(health.status, "ok");
    assert_eq!(health.ocr_languages, vec!["en", "es"]);
    assert_eq!(health.models.len(), 3);
    assert!(health.models.iter().all(|m| m.available));
}

#[tokio::test]
async fn test_health_reports_missing_ocr() {
    let state = app_state(dispatcher(
        Arc::new(FakeObjects::default()),
        Arc::new(FakeScenes::new(0)),
        Arc::new(FakeText::new(&[], "")),
    ));
    let app = create_router(state);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let health: HealthResponse = serde_json::from_slice(&body).unwrap();

    let ocr = health.models.iter().find(|m| m.name == "ocr").unwrap();
    assert!(!ocr.available);
    assert!(health.ocr_languages.is_empty());
}

#[tokio::test]
async fn test_index_banner() {
    let app = create_router(app_state(default_dispatcher()));

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"Backend is running. WebSocket connections accepted.");
}
