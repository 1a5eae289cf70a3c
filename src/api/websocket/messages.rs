// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::detection::{DetectionMode, ResponseEnvelope, GENERIC_SERVER_ERROR};

/// Event name for dispatcher replies and lifecycle notices
pub const RESPONSE_EVENT: &str = "response";

pub const CONNECTED_MESSAGE: &str = "Connected to VisionAid backend";

/// Named message, both directions: `{"event": "...", "data": {...}}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SocketFrame {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

impl SocketFrame {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    pub fn parse(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn reply(event: &str, envelope: &ResponseEnvelope) -> serde_json::Result<Self> {
        Ok(Self::new(event, serde_json::to_value(envelope)?))
    }

    /// Acknowledgment sent as soon as a client connects
    pub fn connected() -> Self {
        Self::new(
            RESPONSE_EVENT,
            json!({"result": CONNECTED_MESSAGE, "event": "connect"}),
        )
    }

    /// Generic failure for anything the dispatcher did not answer itself
    pub fn server_error() -> Self {
        Self::new(
            RESPONSE_EVENT,
            json!({"result": {"status": "error", "message": GENERIC_SERVER_ERROR}}),
        )
    }

    pub fn to_text(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Inbound events the server reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundEvent {
    /// Full request; `type` picks the mode
    Message,
    DetectObjects,
    DetectScene,
    Ocr,
}

impl InboundEvent {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "message" => Some(InboundEvent::Message),
            "detect-objects" => Some(InboundEvent::DetectObjects),
            "detect-scene" => Some(InboundEvent::DetectScene),
            "ocr" => Some(InboundEvent::Ocr),
            _ => None,
        }
    }

    pub fn forced_mode(&self) -> Option<DetectionMode> {
        match self {
            InboundEvent::Message => None,
            InboundEvent::DetectObjects => Some(DetectionMode::ObjectDetection),
            InboundEvent::DetectScene => Some(DetectionMode::SceneDetection),
            InboundEvent::Ocr => Some(DetectionMode::TextDetection),
        }
    }

    pub fn reply_event(&self) -> &'static str {
        match self {
            InboundEvent::Message => RESPONSE_EVENT,
            InboundEvent::DetectObjects => "object-detection-result",
            InboundEvent::DetectScene => "scene-detection-result",
            InboundEvent::Ocr => "ocr-result",
        }
    }
}
