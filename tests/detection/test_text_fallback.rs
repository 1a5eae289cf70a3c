// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR language validation and default-language retry

use serde_json::json;
use std::sync::Arc;
use visionaid_node::detection::DetectionResult;

use crate::common::{dispatcher, png_base64, FakeObjects, FakeScenes, FakeText};

fn run_text(text: Arc<FakeText>, language: Option<&str>) -> DetectionResult {
    let d = dispatcher(
        Arc::new(FakeObjects::default()),
        Arc::new(FakeScenes::new(0)),
        text,
    );
    let mut payload = json!({"image": png_base64(8, 8), "type": "text_detection"});
    if let Some(lang) = language {
        payload["language"] = json!(lang);
    }
    d.dispatch("client-1", &payload, None).result
}

#[test]
fn test_unsupported_language_substitutes_default() {
    let text = Arc::new(FakeText::new(&["en"], "EXIT"));
    let result = run_text(text.clone(), Some("klingon"));

    assert_eq!(result, DetectionResult::Text("EXIT".to_string()));
    assert_eq!(text.requested(), vec!["en"]);
}

#[test]
fn test_missing_language_defaults() {
    let text = Arc::new(FakeText::new(&["en"], "hello"));
    run_text(text.clone(), None);
    assert_eq!(text.requested(), vec!["en"]);
}

#[test]
fn test_uppercase_language_is_normalized() {
    let text = Arc::new(FakeText::new(&["en", "es"], "salida"));
    let result = run_text(text.clone(), Some("ES"));
    assert_eq!(result, DetectionResult::Text("salida".to_string()));
    assert_eq!(text.requested(), vec!["es"]);
}

#[test]
fn test_missing_pack_falls_back_once() {
    // fr is configured but its pack is not loaded
    let text = Arc::new(FakeText::new(&["en"], "Sortie"));
    let result = run_text(text.clone(), Some("fr"));

    assert_eq!(result, DetectionResult::Text("Sortie".to_string()));
    assert_eq!(text.requested(), vec!["fr", "en"]);
}

#[test]
fn test_no_packs_is_language_error() {
    let text = Arc::new(FakeText::new(&[], "unused"));
    let result = run_text(text.clone(), Some("fr"));

    assert_eq!(
        result,
        DetectionResult::error("OCR language 'fr' not available")
    );
    assert_eq!(text.requested().len(), 2);
}

#[test]
fn test_whitespace_only_text_is_none() {
    let text = Arc::new(FakeText::new(&["en"], "  \n  "));
    let result = run_text(text, Some("en"));
    assert_eq!(result.status(), "none");
}
