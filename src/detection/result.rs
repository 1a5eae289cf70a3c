// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Uniform detection result contract
//!
//! Every normalizer produces exactly one [`DetectionResult`]. On the wire it is
//! a JSON object tagged by `status`:
//!
//! ```json
//! {"status": "ok", "detections": [{"name": "person", "confidence": 0.91, ...}]}
//! {"status": "ok", "scene": "kitchen"}
//! {"status": "ok", "text": "EXIT"}
//! {"status": "found", "name": "cup", "confidence": 0.8, "center_x": 0.4, ...}
//! {"status": "not_found", "object": "cup"}
//! {"status": "none", "message": "No objects detected"}
//! {"status": "error", "message": "Invalid or corrupt image data"}
//! ```

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::vision::NormalizedBox;

/// One object, box geometry as fractions of the image size
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub name: String,
    pub confidence: f32,
    pub center_x: f32,
    pub center_y: f32,
    pub width: f32,
    pub height: f32,
}

impl Detection {
    /// Convert corner coordinates to center/size form
    pub fn from_box(name: impl Into<String>, confidence: f32, bbox: &NormalizedBox) -> Self {
        Self {
            name: name.into(),
            confidence,
            center_x: (bbox.x1 + bbox.x2) / 2.0,
            center_y: (bbox.y1 + bbox.y2) / 2.0,
            width: bbox.x2 - bbox.x1,
            height: bbox.y2 - bbox.y1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetectionResult {
    /// Enumerate mode: at most `max_results`, confidence descending
    Objects(Vec<Detection>),
    Scene(String),
    Text(String),
    /// Focus mode hit
    Found(Detection),
    /// Focus mode miss; carries the requested class
    NotFound(String),
    /// Detector ran, nothing qualified
    None(String),
    Error(String),
}

impl DetectionResult {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    pub fn status(&self) -> &'static str {
        match self {
            Self::Objects(_) | Self::Scene(_) | Self::Text(_) => "ok",
            Self::Found(_) => "found",
            Self::NotFound(_) => "not_found",
            Self::None(_) => "none",
            Self::Error(_) => "error",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Short human-readable form for log lines
    pub fn summary(&self) -> String {
        match self {
            Self::Objects(list) => list
                .iter()
                .map(|d| d.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            Self::Scene(label) => label.clone(),
            Self::Text(text) => text.replace('\n', " "),
            Self::Found(d) => format!("found {}", d.name),
            Self::NotFound(object) => format!("{} not found", object),
            Self::None(message) | Self::Error(message) => message.clone(),
        }
    }
}

impl Serialize for DetectionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("status", self.status())?;
        match self {
            Self::Objects(list) => map.serialize_entry("detections", list)?,
            Self::Scene(label) => map.serialize_entry("scene", label)?,
            Self::Text(text) => map.serialize_entry("text", text)?,
            Self::Found(d) => {
                map.serialize_entry("name", &d.name)?;
                map.serialize_entry("confidence", &d.confidence)?;
                map.serialize_entry("center_x", &d.center_x)?;
                map.serialize_entry("center_y", &d.center_y)?;
                map.serialize_entry("width", &d.width)?;
                map.serialize_entry("height", &d.height)?;
            }
            Self::NotFound(object) => map.serialize_entry("object", object)?,
            Self::None(message) | Self::Error(message) => {
                map.serialize_entry("message", message)?
            }
        }
        map.end()
    }
}

/// `{"result": <DetectionResult>}`, one per request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEnvelope {
    pub result: DetectionResult,
}

impl From<DetectionResult> for ResponseEnvelope {
    fn from(result: DetectionResult) -> Self {
        Self { result }
    }
}
