// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use thiserror::Error;

use crate::vision::ImageError;

/// Client-facing text for anything not otherwise classified
pub const GENERIC_SERVER_ERROR: &str = "Server Error: An unexpected error occurred.";

/// Failure kinds a dispatch can end in
///
/// All of them become an `error` result; none of them are fatal to the
/// process. Only `Internal` hides its detail from the client.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Malformed or incomplete request; no detector was invoked
    #[error("{0}")]
    Validation(String),

    #[error("Invalid or corrupt image data")]
    Decode(#[from] ImageError),

    #[error("Unsupported detection type '{0}'")]
    UnsupportedMode(String),

    /// Provider raised or returned something unusable
    #[error("{message}")]
    Detector {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// OCR language pack unavailable after the fallback chain
    #[error("OCR language '{0}' not available")]
    LanguageResource(String),

    #[error("internal error: {0:#}")]
    Internal(anyhow::Error),
}

impl DispatchError {
    pub fn detector(message: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Detector {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Message safe to send back over the wire
    pub fn client_message(&self) -> String {
        match self {
            DispatchError::Internal(_) => GENERIC_SERVER_ERROR.to_string(),
            other => other.to_string(),
        }
    }
}
