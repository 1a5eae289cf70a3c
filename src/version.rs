// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the VisionAid node

/// Full version string with feature description
pub const VERSION: &str = "v1.0.0-visionaid-dispatch-2025-10-13";

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2025-10-13";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "object-detection",
    "focus-detection",
    "scene-detection",
    "multi-language-ocr",
    "ocr-language-fallback",
    "websocket-dispatch",
    "user-customization",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("VisionAid Node {} ({})", VERSION_NUMBER, BUILD_DATE)
}

/// Get full version info for API responses
pub fn get_version_info() -> serde_json::Value {
    serde_json::json!({
        "version": VERSION_NUMBER,
        "build": VERSION,
        "date": BUILD_DATE,
        "features": FEATURES,
    })
}
