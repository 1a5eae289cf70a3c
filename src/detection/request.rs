// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Inbound detection request parsing

use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::errors::DispatchError;

/// Wire names of the supported detection modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectionMode {
    ObjectDetection,
    FocusDetection,
    SceneDetection,
    TextDetection,
}

impl DetectionMode {
    pub const ALL: [DetectionMode; 4] = [
        DetectionMode::ObjectDetection,
        DetectionMode::FocusDetection,
        DetectionMode::SceneDetection,
        DetectionMode::TextDetection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMode::ObjectDetection => "object_detection",
            DetectionMode::FocusDetection => "focus_detection",
            DetectionMode::SceneDetection => "scene_detection",
            DetectionMode::TextDetection => "text_detection",
        }
    }
}

impl fmt::Display for DetectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetectionMode {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DetectionMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| DispatchError::UnsupportedMode(s.to_string()))
    }
}

/// Mode plus only the parameters that mode needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionTask {
    Objects,
    Focus { object: String },
    Scene,
    Text { language: String },
}

impl DetectionTask {
    pub fn mode(&self) -> DetectionMode {
        match self {
            DetectionTask::Objects => DetectionMode::ObjectDetection,
            DetectionTask::Focus { .. } => DetectionMode::FocusDetection,
            DetectionTask::Scene => DetectionMode::SceneDetection,
            DetectionTask::Text { .. } => DetectionMode::TextDetection,
        }
    }
}

/// A validated request; the image payload is still encoded
///
/// The mode name is kept verbatim. An unknown mode only fails when
/// [`DetectionRequest::task`] is resolved, which the dispatcher does after
/// the image has decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionRequest {
    pub image: String,
    pub mode: String,
    task: Option<DetectionTask>,
}

fn non_empty_str<'a>(obj: &'a serde_json::Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

impl DetectionRequest {
    /// Validate a raw message
    ///
    /// `forced_mode` replaces the `type` field (used by the single-purpose
    /// socket events). `default_language` fills in a missing `language`.
    pub fn parse(
        data: &Value,
        forced_mode: Option<DetectionMode>,
        default_language: &str,
    ) -> Result<Self, DispatchError> {
        let obj = data
            .as_object()
            .ok_or_else(|| DispatchError::Validation("Invalid data format".to_string()))?;

        let image = non_empty_str(obj, "image");
        let mode = match forced_mode {
            Some(mode) => Some(mode.as_str()),
            None => non_empty_str(obj, "type"),
        };

        let (Some(image), Some(mode)) = (image, mode) else {
            return Err(DispatchError::Validation(
                "Missing 'image' or 'type'".to_string(),
            ));
        };

        let task = match mode.parse::<DetectionMode>().ok() {
            Some(DetectionMode::ObjectDetection) => Some(DetectionTask::Objects),
            Some(DetectionMode::FocusDetection) => {
                let object = non_empty_str(obj, "focus_object").ok_or_else(|| {
                    DispatchError::Validation(
                        "Missing 'focus_object' for focus_detection".to_string(),
                    )
                })?;
                Some(DetectionTask::Focus {
                    object: object.to_string(),
                })
            }
            Some(DetectionMode::SceneDetection) => Some(DetectionTask::Scene),
            Some(DetectionMode::TextDetection) => Some(DetectionTask::Text {
                language: non_empty_str(obj, "language")
                    .unwrap_or(default_language)
                    .to_lowercase(),
            }),
            None => None,
        };

        Ok(Self {
            image: image.to_string(),
            mode: mode.to_string(),
            task,
        })
    }

    pub fn task(&self) -> Result<&DetectionTask, DispatchError> {
        self.task
            .as_ref()
            .ok_or_else(|| DispatchError::UnsupportedMode(self.mode.clone()))
    }
}
