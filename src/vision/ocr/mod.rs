// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR on ONNX Runtime (PaddleOCR-style models)
//!
//! Components:
//! - `detection` - language-agnostic text region detector
//! - `recognition` - per-language line recognizer (CTC)
//! - `preprocessing` - tensor preparation for both models
//! - `reader` - multi-language reader implementing `TextRecognizer`

pub mod detection;
pub mod preprocessing;
pub mod reader;
pub mod recognition;

pub use detection::{TextRegion, TextRegionDetector};
pub use reader::OnnxTextRecognizer;
pub use recognition::LineRecognizer;
