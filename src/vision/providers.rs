// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Capability provider traits
//!
//! The dispatcher only sees these three traits. Implementations are loaded
//! once at startup and shared read-only across concurrent requests; any
//! internal serialisation (e.g. a locked ONNX session) is the provider's
//! business.

use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::warn;

use super::image_utils::DecodedImage;

/// Box corners normalised to [0, 1] relative to the source image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

/// One raw object prediction, already at or above the requested threshold
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    pub class_name: String,
    pub confidence: f32,
    pub bbox: NormalizedBox,
}

/// Top-1 scene prediction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenePrediction {
    pub label_id: usize,
    pub confidence: f32,
}

/// Failures reported by a text recognizer
#[derive(Debug, Error)]
pub enum TextRecognitionError {
    /// The language pack for this code is not loaded
    #[error("OCR language '{0}' not available")]
    LanguageUnavailable(String),

    #[error("Text recognition failed: {0}")]
    Failed(#[from] anyhow::Error),
}

/// Object detector: returns every prediction with `confidence >= threshold`
#[cfg_attr(test, mockall::automock)]
pub trait ObjectClassifier: Send + Sync {
    fn classify_objects(
        &self,
        image: &DecodedImage,
        confidence_threshold: f32,
    ) -> anyhow::Result<Vec<RawDetection>>;
}

/// Single-label scene classifier
#[cfg_attr(test, mockall::automock)]
pub trait SceneClassifier: Send + Sync {
    fn classify_scene(&self, image: &DecodedImage) -> anyhow::Result<ScenePrediction>;
}

/// Text recognizer with per-language resources
#[cfg_attr(test, mockall::automock)]
pub trait TextRecognizer: Send + Sync {
    fn recognize_text(
        &self,
        image: &DecodedImage,
        language: &str,
    ) -> Result<String, TextRecognitionError>;

    /// Language codes whose resources are loaded
    fn loaded_languages(&self) -> Vec<String>;
}

/// Lock a model session, recovering it if a previous holder panicked.
///
/// A panic mid-inference is caught by the dispatcher; the session itself
/// holds no per-request state, so it stays usable.
pub fn lock_session<'a, T>(session: &'a Mutex<T>, model: &str) -> MutexGuard<'a, T> {
    session.lock().unwrap_or_else(|poisoned: PoisonError<MutexGuard<'a, T>>| {
        warn!("{} session lock was poisoned; recovering", model);
        poisoned.into_inner()
    })
}
