// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! End-to-end dispatcher scenarios through `Dispatcher::dispatch`

use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use visionaid_node::detection::{DetectionMode, GENERIC_SERVER_ERROR};

use crate::common::{detection, dispatcher, png_base64, FakeObjects, FakeScenes, FakeText};

fn result_of(envelope: &visionaid_node::ResponseEnvelope) -> Value {
    serde_json::to_value(envelope).unwrap()["result"].clone()
}

#[test]
fn test_not_base64_payload_is_error() {
    let objects = Arc::new(FakeObjects::default());
    let d = dispatcher(
        objects.clone(),
        Arc::new(FakeScenes::new(0)),
        Arc::new(FakeText::new(&["en"], "")),
    );

    let envelope = d.dispatch(
        "client-1",
        &json!({"image": "not-base64!!", "type": "object_detection"}),
        None,
    );

    let result = result_of(&envelope);
    assert_eq!(result["status"], "error");
    assert_eq!(result["message"], "Invalid or corrupt image data");
    assert_eq!(objects.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_focus_without_object_never_reaches_detector() {
    let objects = Arc::new(FakeObjects::default());
    let d = dispatcher(
        objects.clone(),
        Arc::new(FakeScenes::new(0)),
        Arc::new(FakeText::new(&["en"], "")),
    );

    let envelope = d.dispatch(
        "client-1",
        &json!({"image": png_base64(4, 4), "type": "focus_detection"}),
        None,
    );

    let result = result_of(&envelope);
    assert_eq!(result["status"], "error");
    assert!(result["message"].as_str().unwrap().contains("focus_object"));
    assert_eq!(objects.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_scene_last_valid_index() {
    let d = dispatcher(
        Arc::new(FakeObjects::default()),
        Arc::new(FakeScenes::new(364)),
        Arc::new(FakeText::new(&["en"], "")),
    );

    let envelope = d.dispatch(
        "client-1",
        &json!({"image": png_base64(4, 4), "type": "scene_detection"}),
        None,
    );

    assert_eq!(
        result_of(&envelope),
        json!({"status": "ok", "scene": "Label 364"})
    );
}

#[test]
fn test_scene_out_of_bounds_is_error() {
    let d = dispatcher(
        Arc::new(FakeObjects::default()),
        Arc::new(FakeScenes::new(365)),
        Arc::new(FakeText::new(&["en"], "")),
    );

    let envelope = d.dispatch(
        "client-1",
        &json!({"image": png_base64(4, 4), "type": "scene_detection"}),
        None,
    );

    assert_eq!(result_of(&envelope)["status"], "error");
}

#[test]
fn test_bogus_mode() {
    let d = dispatcher(
        Arc::new(FakeObjects::default()),
        Arc::new(FakeScenes::new(0)),
        Arc::new(FakeText::new(&["en"], "")),
    );

    let envelope = d.dispatch(
        "client-1",
        &json!({"image": png_base64(4, 4), "type": "bogus_mode"}),
        None,
    );

    assert_eq!(
        result_of(&envelope),
        json!({"status": "error", "message": "Unsupported detection type 'bogus_mode'"})
    );
}

#[test]
fn test_unknown_mode_checked_after_fields_and_decode() {
    let objects = Arc::new(FakeObjects::default());
    let d = dispatcher(
        objects.clone(),
        Arc::new(FakeScenes::new(0)),
        Arc::new(FakeText::new(&["en"], "")),
    );

    let envelope = d.dispatch("client-1", &json!({"type": "bogus_mode"}), None);
    assert_eq!(result_of(&envelope)["message"], "Missing 'image' or 'type'");

    let envelope = d.dispatch(
        "client-1",
        &json!({"image": "not-base64!!", "type": "bogus_mode"}),
        None,
    );
    assert_eq!(result_of(&envelope)["message"], "Invalid or corrupt image data");
    assert_eq!(objects.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_non_object_payload() {
    let d = dispatcher(
        Arc::new(FakeObjects::default()),
        Arc::new(FakeScenes::new(0)),
        Arc::new(FakeText::new(&["en"], "")),
    );

    for payload in [json!("just a string"), json!(42), json!(null), json!([1, 2])] {
        let envelope = d.dispatch("client-1", &payload, None);
        let result = result_of(&envelope);
        assert_eq!(result["status"], "error");
        assert_eq!(result["message"], "Invalid data format");
        assert_ne!(result["message"], GENERIC_SERVER_ERROR);
    }
}

#[test]
fn test_forced_object_mode() {
    let objects = Arc::new(FakeObjects::new(vec![detection(
        "person",
        0.9,
        [0.2, 0.1, 0.6, 0.5],
    )]));
    let d = dispatcher(
        objects.clone(),
        Arc::new(FakeScenes::new(0)),
        Arc::new(FakeText::new(&["en"], "")),
    );

    let envelope = d.dispatch(
        "client-1",
        &json!({"image": png_base64(4, 4)}),
        Some(DetectionMode::ObjectDetection),
    );

    let result = result_of(&envelope);
    assert_eq!(result["status"], "ok");
    assert_eq!(result["detections"][0]["name"], "person");
    assert_eq!(objects.calls.load(Ordering::SeqCst), 1);
}
