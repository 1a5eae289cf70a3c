// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision capability providers
//!
//! This module provides:
//! - Frame decoding from base64 / data-URL payloads
//! - Object detection via YOLO
//! - Scene classification via Places365
//! - OCR via PaddleOCR-style detection + recognition models
//!
//! All models run on CPU through ONNX Runtime.

pub mod image_utils;
pub mod labels;
pub mod model_manager;
pub mod ocr;
pub mod places;
pub mod providers;
pub mod yolo;

pub use image_utils::{decode_image_bytes, decode_payload, detect_format, DecodedImage, ImageError};
pub use model_manager::{VisionModelInfo, VisionModelManager};
pub use providers::{
    NormalizedBox, ObjectClassifier, RawDetection, SceneClassifier, ScenePrediction,
    TextRecognitionError, TextRecognizer,
};
