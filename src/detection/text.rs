// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text recognition normalizer with language fallback
//!
//! Language handling happens in two places:
//! 1. An unsupported code is replaced by the default before any attempt.
//! 2. If the provider reports the language pack missing, one retry runs
//!    with the default language. Never more than two attempts.

use tracing::{debug, warn};

use super::errors::DispatchError;
use super::result::DetectionResult;
use crate::vision::{DecodedImage, TextRecognitionError, TextRecognizer};

pub const NO_TEXT_MESSAGE: &str = "No text detected";

/// Upper bound on provider calls per request
pub const MAX_OCR_ATTEMPTS: usize = 2;

/// Resolve the language to try first
pub fn validate_language<'a>(
    requested: &'a str,
    supported: &[String],
    default_language: &'a str,
) -> &'a str {
    if supported.iter().any(|l| l == requested) {
        requested
    } else {
        warn!(
            "Unsupported OCR language '{}' requested. Falling back to '{}'.",
            requested, default_language
        );
        default_language
    }
}

/// Ordered languages to try, at most [`MAX_OCR_ATTEMPTS`] long
pub fn attempt_plan<'a>(language: &'a str, default_language: &'a str) -> Vec<&'a str> {
    if language == default_language {
        vec![language]
    } else {
        vec![language, default_language]
    }
}

pub fn normalize_text(
    image: &DecodedImage,
    requested_language: &str,
    provider: &dyn TextRecognizer,
    supported_languages: &[String],
    default_language: &str,
) -> Result<DetectionResult, DispatchError> {
    let language = validate_language(requested_language, supported_languages, default_language);
    let plan = attempt_plan(language, default_language);

    for (attempt, lang) in plan.iter().enumerate() {
        debug!("Starting text detection for language: '{}'...", lang);
        match provider.recognize_text(image, lang) {
            Ok(raw) => {
                let text = raw.trim();
                if text.is_empty() {
                    return Ok(DetectionResult::None(NO_TEXT_MESSAGE.to_string()));
                }
                return Ok(DetectionResult::Text(text.to_string()));
            }
            Err(TextRecognitionError::LanguageUnavailable(missing)) => {
                if let Some(next) = plan.get(attempt + 1) {
                    warn!(
                        "OCR language '{}' not loaded, retrying with '{}'",
                        missing, next
                    );
                    continue;
                }
                return Err(DispatchError::LanguageResource(language.to_string()));
            }
            Err(TextRecognitionError::Failed(e)) => {
                return Err(DispatchError::detector(
                    format!("Error during text detection ({})", lang),
                    e,
                ));
            }
        }
    }

    // plan is never empty
    Err(DispatchError::LanguageResource(language.to_string()))
}
