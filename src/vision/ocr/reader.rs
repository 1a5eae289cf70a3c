// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Multi-language OCR reader
//!
//! Directory layout under the OCR model dir:
//!
//! ```text
//! det_model.onnx          shared text-region detector (optional)
//! <lang>/rec_model.onnx   recognizer for <lang>
//! <lang>/dict.txt         character dictionary for <lang>
//! ```
//!
//! Languages are loaded independently; a language that fails to load is
//! simply absent and requests for it report `LanguageUnavailable`.

use image::{imageops, RgbImage};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, error, info, warn};

use super::detection::TextRegionDetector;
use super::recognition::LineRecognizer;
use crate::vision::image_utils::DecodedImage;
use crate::vision::providers::{TextRecognitionError, TextRecognizer};

pub struct OnnxTextRecognizer {
    detector: Option<TextRegionDetector>,
    readers: HashMap<String, LineRecognizer>,
}

impl OnnxTextRecognizer {
    /// Load the shared detector and one reader per requested language
    pub fn load(model_dir: &Path, languages: &[String], default_language: &str) -> Self {
        let det_path = model_dir.join("det_model.onnx");
        let detector = match TextRegionDetector::new(&det_path) {
            Ok(d) => Some(d),
            Err(e) => {
                warn!("⚠️ OCR region detector unavailable ({}); reading whole frames as one line", e);
                None
            }
        };

        let mut readers = HashMap::new();
        for lang in languages {
            let lang_dir = model_dir.join(lang);
            debug!("Loading OCR reader for language '{}'...", lang);
            match LineRecognizer::new(lang_dir.join("rec_model.onnx"), lang_dir.join("dict.txt")) {
                Ok(reader) => {
                    info!(
                        "✅ OCR reader for '{}' loaded ({} symbols)",
                        lang,
                        reader.dictionary_size()
                    );
                    readers.insert(lang.clone(), reader);
                }
                Err(e) => {
                    error!("Failed to load OCR reader for language '{}': {:#}", lang, e);
                }
            }
        }

        if !readers.contains_key(default_language) {
            error!(
                "Default OCR language '{}' failed to load! Text detection may fail.",
                default_language
            );
        }

        Self { detector, readers }
    }

    fn read_regions(
        &self,
        reader: &LineRecognizer,
        rgb: &RgbImage,
    ) -> anyhow::Result<Vec<String>> {
        let Some(detector) = &self.detector else {
            return Ok(vec![reader.recognize(rgb)?]);
        };

        let mut lines = Vec::new();
        for region in detector.detect(rgb)? {
            let crop = imageops::crop_imm(rgb, region.x, region.y, region.width, region.height)
                .to_image();
            let text = reader.recognize(&crop)?;
            if !text.trim().is_empty() {
                lines.push(text);
            }
        }
        Ok(lines)
    }
}

impl TextRecognizer for OnnxTextRecognizer {
    fn recognize_text(
        &self,
        image: &DecodedImage,
        language: &str,
    ) -> Result<String, TextRecognitionError> {
        let reader = self
            .readers
            .get(language)
            .ok_or_else(|| TextRecognitionError::LanguageUnavailable(language.to_string()))?;

        let rgb = image.to_rgb_image();
        let lines = self.read_regions(reader, &rgb)?;
        Ok(lines.join("\n"))
    }

    fn loaded_languages(&self) -> Vec<String> {
        let mut langs: Vec<String> = self.readers.keys().cloned().collect();
        langs.sort();
        langs
    }
}
