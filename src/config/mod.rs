// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration loaded from the environment

use std::env;
use std::path::PathBuf;

/// Default maximum WebSocket message size (10MB)
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 10 * 1024 * 1024;

/// Runtime configuration for the detection service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Model and label file locations
    pub models: ModelPaths,
    /// Detection tuning and language policy
    pub detection: DetectionSettings,
    /// Largest accepted WebSocket message in bytes
    pub max_message_bytes: usize,
    /// Size of the blocking detection worker pool
    pub max_concurrent_detections: usize,
}

#[derive(Debug, Clone)]
pub struct ModelPaths {
    pub object_model: PathBuf,
    /// One class name per line; built-in COCO list when unset
    pub object_classes: Option<PathBuf>,
    pub scene_model: PathBuf,
    pub scene_labels: PathBuf,
    pub ocr_dir: PathBuf,
}

/// Parameters the dispatcher reads on every request
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionSettings {
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub max_results: usize,
    pub supported_languages: Vec<String>,
    pub default_language: String,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.4,
            iou_threshold: 0.45,
            max_results: 3,
            supported_languages: vec!["en".to_string(), "es".to_string(), "fr".to_string()],
            default_language: "en".to_string(),
        }
    }
}

impl Default for ModelPaths {
    fn default() -> Self {
        Self {
            object_model: PathBuf::from("./models/yolov5n.onnx"),
            object_classes: None,
            scene_model: PathBuf::from("./models/resnet50_places365.onnx"),
            scene_labels: PathBuf::from("./models/categories_places365.txt"),
            ocr_dir: PathBuf::from("./models/ocr"),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            models: ModelPaths::default(),
            detection: DetectionSettings::default(),
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            max_concurrent_detections: 4,
        }
    }
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Split a comma-separated language list, lowercased, empties dropped
pub fn parse_language_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
        .collect()
}

impl ServiceConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: env::var("API_HOST").unwrap_or(defaults.host),
            port: parsed("API_PORT", defaults.port),
            models: ModelPaths {
                object_model: env::var("OBJECT_MODEL_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.models.object_model),
                object_classes: env::var("OBJECT_CLASSES_PATH").ok().map(PathBuf::from),
                scene_model: env::var("SCENE_MODEL_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.models.scene_model),
                scene_labels: env::var("SCENE_LABELS_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.models.scene_labels),
                ocr_dir: env::var("OCR_MODEL_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.models.ocr_dir),
            },
            detection: DetectionSettings {
                confidence_threshold: parsed(
                    "OBJECT_CONFIDENCE_THRESHOLD",
                    defaults.detection.confidence_threshold,
                ),
                iou_threshold: parsed("OBJECT_IOU_THRESHOLD", defaults.detection.iou_threshold),
                max_results: parsed("MAX_OBJECT_RESULTS", defaults.detection.max_results),
                supported_languages: env::var("OCR_LANGUAGES")
                    .map(|v| parse_language_list(&v))
                    .unwrap_or(defaults.detection.supported_languages),
                default_language: env::var("DEFAULT_OCR_LANGUAGE")
                    .map(|v| v.trim().to_lowercase())
                    .unwrap_or(defaults.detection.default_language),
            },
            max_message_bytes: parsed("MAX_MESSAGE_BYTES", defaults.max_message_bytes),
            max_concurrent_detections: parsed(
                "MAX_CONCURRENT_DETECTIONS",
                defaults.max_concurrent_detections,
            ),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        self.detection.validate()?;
        if self.max_message_bytes == 0 {
            return Err("Max message size must be greater than 0".to_string());
        }
        if self.max_concurrent_detections == 0 {
            return Err("Detection worker pool must have at least one worker".to_string());
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DetectionSettings {
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(format!(
                "Confidence threshold must be within [0, 1], got {}",
                self.confidence_threshold
            ));
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(format!(
                "IoU threshold must be within [0, 1], got {}",
                self.iou_threshold
            ));
        }
        if self.max_results == 0 {
            return Err("Max object results must be greater than 0".to_string());
        }
        if self.supported_languages.is_empty() {
            return Err("At least one OCR language must be configured".to_string());
        }
        if !self.supported_languages.contains(&self.default_language) {
            return Err(format!(
                "Default OCR language '{}' is not in the supported list {:?}",
                self.default_language, self.supported_languages
            ));
        }
        Ok(())
    }

    pub fn is_supported_language(&self, language: &str) -> bool {
        self.supported_languages.iter().any(|l| l == language)
    }
}
