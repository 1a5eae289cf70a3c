// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection request dispatcher
//!
//! One call per inbound message:
//!
//! ```text
//! Received -> Validated -> ImageDecoded -> Detected -> Packaged
//!     \__________\_____________\______________\____> Failed(stage)
//! ```
//!
//! Sending is the transport's job. The dispatcher owns no mutable state;
//! everything it reads lives in an immutable [`DetectionContext`].

use serde_json::Value;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::errors::DispatchError;
use super::objects::normalize_objects;
use super::request::{DetectionMode, DetectionRequest, DetectionTask};
use super::result::{DetectionResult, ResponseEnvelope};
use super::scene::normalize_scene;
use super::text::normalize_text;
use crate::config::DetectionSettings;
use crate::vision::{decode_payload, DecodedImage, VisionModelManager};

const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStage {
    Received,
    Validated,
    ImageDecoded,
    Detected,
    Packaged,
}

/// Loaded providers plus settings, built once at startup
#[derive(Debug, Clone)]
pub struct DetectionContext {
    pub models: VisionModelManager,
    pub settings: DetectionSettings,
}

impl DetectionContext {
    pub fn new(models: VisionModelManager, settings: DetectionSettings) -> Self {
        Self { models, settings }
    }
}

#[derive(Debug, Clone)]
pub struct Dispatcher {
    context: Arc<DetectionContext>,
}

impl Dispatcher {
    pub fn new(context: Arc<DetectionContext>) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &DetectionContext {
        &self.context
    }

    /// Handle one raw message; always yields exactly one envelope
    ///
    /// `forced_mode` overrides the message's `type` field.
    pub fn dispatch(
        &self,
        client_id: &str,
        data: &Value,
        forced_mode: Option<DetectionMode>,
    ) -> ResponseEnvelope {
        let start = Instant::now();
        let mut stage = DispatchStage::Received;

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.run(client_id, data, forced_mode, &mut stage)
        }))
        .unwrap_or_else(|payload| {
            let detail = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(DispatchError::Internal(anyhow::anyhow!(
                "detector panicked: {}",
                detail
            )))
        });

        let elapsed = start.elapsed().as_secs_f64();
        let mode_name = mode_label(data, forced_mode);

        let result = match outcome {
            Ok(result) => {
                info!(
                    "Completed {} for {} in {:.3}s. Result: '{}...'",
                    mode_name,
                    client_id,
                    elapsed,
                    preview(&result)
                );
                result
            }
            Err(err) => {
                match &err {
                    DispatchError::Internal(e) => error!(
                        "Unhandled error processing '{}' request for {} after {:.3}s at {:?}: {:#}",
                        mode_name, client_id, elapsed, stage, e
                    ),
                    DispatchError::Detector {
                        message,
                        source: Some(e),
                    } => error!(
                        "{} for {} at {:?}: {:#}",
                        message, client_id, stage, e
                    ),
                    other => warn!(
                        "Request from {} failed at {:?} after {:.3}s: {}",
                        client_id, stage, elapsed, other
                    ),
                }
                DetectionResult::error(err.client_message())
            }
        };

        debug!("{} -> {:?}", client_id, DispatchStage::Packaged);
        ResponseEnvelope::from(result)
    }

    fn run(
        &self,
        client_id: &str,
        data: &Value,
        forced_mode: Option<DetectionMode>,
        stage: &mut DispatchStage,
    ) -> Result<DetectionResult, DispatchError> {
        let settings = &self.context.settings;

        // 1. Validate
        let request = DetectionRequest::parse(data, forced_mode, &settings.default_language)?;
        *stage = DispatchStage::Validated;
        info!(
            "Processing request from {}. Type: '{}'{}",
            client_id,
            request.mode,
            match request.task() {
                Ok(DetectionTask::Text { language }) => format!(", Lang: '{}'", language),
                _ => String::new(),
            }
        );

        // 2. Decode
        let image = decode_payload(&request.image)?;
        *stage = DispatchStage::ImageDecoded;
        debug!(
            "Image decoded for {}: {}x{}",
            client_id,
            image.width(),
            image.height()
        );

        // 3. Route, detect, normalize
        let task = request.task()?;
        let result = self.detect(&image, task)?;
        *stage = DispatchStage::Detected;

        Ok(result)
    }

    fn detect(
        &self,
        image: &DecodedImage,
        task: &DetectionTask,
    ) -> Result<DetectionResult, DispatchError> {
        let models = &self.context.models;
        let settings = &self.context.settings;

        match task {
            DetectionTask::Objects | DetectionTask::Focus { .. } => {
                let predictions = models
                    .objects()
                    .classify_objects(image, settings.confidence_threshold)
                    .map_err(|e| DispatchError::detector("Error in object detection", e))?;
                let focus = match task {
                    DetectionTask::Focus { object } => Some(object.as_str()),
                    _ => None,
                };
                Ok(normalize_objects(predictions, focus, settings.max_results))
            }
            DetectionTask::Scene => {
                let prediction = models
                    .scenes()
                    .classify_scene(image)
                    .map_err(|e| DispatchError::detector("Error in scene detection", e))?;
                debug!(
                    "Scene top-1: id {} ({:.3})",
                    prediction.label_id, prediction.confidence
                );
                Ok(normalize_scene(prediction.label_id, models.scene_labels()))
            }
            DetectionTask::Text { language } => normalize_text(
                image,
                language,
                models.text(),
                &settings.supported_languages,
                &settings.default_language,
            ),
        }
    }
}

fn mode_label(data: &Value, forced_mode: Option<DetectionMode>) -> String {
    match forced_mode {
        Some(mode) => mode.to_string(),
        None => data
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string(),
    }
}

fn preview(result: &DetectionResult) -> String {
    result.summary().chars().take(PREVIEW_CHARS).collect()
}
