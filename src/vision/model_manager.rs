// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision model manager: loads every capability provider once at startup

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::labels::{load_object_classes, load_scene_labels};
use super::ocr::OnnxTextRecognizer;
use super::places::PlacesSceneClassifier;
use super::providers::{ObjectClassifier, SceneClassifier, TextRecognizer};
use super::yolo::YoloObjectDetector;
use crate::config::ServiceConfig;

/// Availability of a loaded model, reported by `/health`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisionModelInfo {
    pub name: String,
    pub model_type: String,
    pub available: bool,
}

/// Read-only handles to the loaded providers and the scene label table
#[derive(Clone)]
pub struct VisionModelManager {
    objects: Arc<dyn ObjectClassifier>,
    scenes: Arc<dyn SceneClassifier>,
    text: Arc<dyn TextRecognizer>,
    scene_labels: Arc<Vec<String>>,
}

impl std::fmt::Debug for VisionModelManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisionModelManager")
            .field("scene_labels", &self.scene_labels.len())
            .field("ocr_languages", &self.text.loaded_languages())
            .finish_non_exhaustive()
    }
}

impl VisionModelManager {
    /// Load the ONNX providers described by `config`
    ///
    /// The object and scene models are critical: failure to load either is
    /// returned as an error and the process should exit. OCR language packs
    /// are optional and only logged when missing.
    pub fn load(config: &ServiceConfig) -> Result<Self> {
        let paths = &config.models;

        let classes = load_object_classes(paths.object_classes.as_deref())?;
        let objects = YoloObjectDetector::new(
            &paths.object_model,
            classes,
            config.detection.iou_threshold,
        )
        .context("Failed to load critical object detection model")?;

        let scenes = PlacesSceneClassifier::new(&paths.scene_model)
            .context("Failed to load critical scene classification model")?;
        let scene_labels = load_scene_labels(&paths.scene_labels);

        info!(
            "Supported OCR languages: {:?}",
            config.detection.supported_languages
        );
        let text = OnnxTextRecognizer::load(
            &paths.ocr_dir,
            &config.detection.supported_languages,
            &config.detection.default_language,
        );

        info!("All ML models loaded successfully (or with noted exceptions).");

        Ok(Self::from_providers(
            Arc::new(objects),
            Arc::new(scenes),
            Arc::new(text),
            scene_labels,
        ))
    }

    /// Assemble from already-built providers
    pub fn from_providers(
        objects: Arc<dyn ObjectClassifier>,
        scenes: Arc<dyn SceneClassifier>,
        text: Arc<dyn TextRecognizer>,
        scene_labels: Vec<String>,
    ) -> Self {
        Self {
            objects,
            scenes,
            text,
            scene_labels: Arc::new(scene_labels),
        }
    }

    pub fn objects(&self) -> &dyn ObjectClassifier {
        self.objects.as_ref()
    }

    pub fn scenes(&self) -> &dyn SceneClassifier {
        self.scenes.as_ref()
    }

    pub fn text(&self) -> &dyn TextRecognizer {
        self.text.as_ref()
    }

    pub fn scene_labels(&self) -> &[String] {
        &self.scene_labels
    }

    /// List all vision models and whether they are usable
    pub fn list_models(&self) -> Vec<VisionModelInfo> {
        vec![
            VisionModelInfo {
                name: "yolo".to_string(),
                model_type: "object_detection".to_string(),
                available: true,
            },
            VisionModelInfo {
                name: "places365".to_string(),
                model_type: "scene_detection".to_string(),
                available: !self.scene_labels.is_empty(),
            },
            VisionModelInfo {
                name: "ocr".to_string(),
                model_type: "text_detection".to_string(),
                available: !self.text.loaded_languages().is_empty(),
            },
        ]
    }
}
