// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared fixtures: fake providers and generated camera frames
#![allow(dead_code)]

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use visionaid_node::{
    api::{AppState, DetectionPool, PoolConfig},
    config::DetectionSettings,
    detection::{DetectionContext, Dispatcher},
    storage::InMemoryUserStore,
    vision::{
        labels::fallback_scene_labels, DecodedImage, NormalizedBox, ObjectClassifier,
        RawDetection, SceneClassifier, ScenePrediction, TextRecognitionError, TextRecognizer,
        VisionModelManager,
    },
};

/// Returns a fixed prediction list, filtered by the threshold it is given
#[derive(Default)]
pub struct FakeObjects {
    pub predictions: Vec<RawDetection>,
    pub calls: AtomicUsize,
}

impl FakeObjects {
    pub fn new(predictions: Vec<RawDetection>) -> Self {
        Self {
            predictions,
            calls: AtomicUsize::new(0),
        }
    }
}

impl ObjectClassifier for FakeObjects {
    fn classify_objects(
        &self,
        _image: &DecodedImage,
        confidence_threshold: f32,
    ) -> anyhow::Result<Vec<RawDetection>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .predictions
            .iter()
            .filter(|p| p.confidence >= confidence_threshold)
            .cloned()
            .collect())
    }
}

pub struct FakeScenes {
    pub label_id: usize,
    pub calls: AtomicUsize,
}

impl FakeScenes {
    pub fn new(label_id: usize) -> Self {
        Self {
            label_id,
            calls: AtomicUsize::new(0),
        }
    }
}

impl SceneClassifier for FakeScenes {
    fn classify_scene(&self, _image: &DecodedImage) -> anyhow::Result<ScenePrediction> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ScenePrediction {
            label_id: self.label_id,
            confidence: 0.8,
        })
    }
}

/// Answers `text` for loaded languages and records every language asked for
pub struct FakeText {
    pub loaded: Vec<String>,
    pub text: String,
    pub requested: Mutex<Vec<String>>,
}

impl FakeText {
    pub fn new(loaded: &[&str], text: &str) -> Self {
        Self {
            loaded: loaded.iter().map(|l| l.to_string()).collect(),
            text: text.to_string(),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl TextRecognizer for FakeText {
    fn recognize_text(
        &self,
        _image: &DecodedImage,
        language: &str,
    ) -> Result<String, TextRecognitionError> {
        self.requested.lock().unwrap().push(language.to_string());
        if self.loaded.iter().any(|l| l == language) {
            Ok(self.text.clone())
        } else {
            Err(TextRecognitionError::LanguageUnavailable(language.to_string()))
        }
    }

    fn loaded_languages(&self) -> Vec<String> {
        self.loaded.clone()
    }
}

pub fn detection(name: &str, confidence: f32, bbox: [f32; 4]) -> RawDetection {
    RawDetection {
        class_name: name.to_string(),
        confidence,
        bbox: NormalizedBox {
            x1: bbox[0],
            y1: bbox[1],
            x2: bbox[2],
            y2: bbox[3],
        },
    }
}

fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 16) as u8, (y * 16) as u8, 200])
    });
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), format)
        .unwrap();
    bytes
}

/// Raw base64 PNG
pub fn png_base64(width: u32, height: u32) -> String {
    STANDARD.encode(encode(width, height, ImageFormat::Png))
}

/// Data-URL JPEG, as a browser camera capture sends it
pub fn jpeg_data_url(width: u32, height: u32) -> String {
    format!(
        "data:image/jpeg;base64,{}",
        STANDARD.encode(encode(width, height, ImageFormat::Jpeg))
    )
}

pub fn dispatcher(
    objects: Arc<FakeObjects>,
    scenes: Arc<FakeScenes>,
    text: Arc<FakeText>,
) -> Dispatcher {
    let models =
        VisionModelManager::from_providers(objects, scenes, text, fallback_scene_labels());
    Dispatcher::new(Arc::new(DetectionContext::new(
        models,
        DetectionSettings::default(),
    )))
}

pub fn default_dispatcher() -> Dispatcher {
    dispatcher(
        Arc::new(FakeObjects::default()),
        Arc::new(FakeScenes::new(0)),
        Arc::new(FakeText::new(&["en"], "")),
    )
}

pub fn app_state(dispatcher: Dispatcher) -> AppState {
    AppState::new(
        DetectionPool::new(dispatcher, PoolConfig { max_concurrent: 2 }),
        Arc::new(InMemoryUserStore::new()),
        1024 * 1024,
    )
}
