// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Scene classification normalizer

use tracing::warn;

use super::result::DetectionResult;

pub const UNKNOWN_SCENE_MESSAGE: &str = "Unknown Scene";

/// Map a predicted label id through the label table
///
/// An id outside the table means the model and label file disagree; that is
/// reported as an error rather than `none`.
pub fn normalize_scene(label_id: usize, label_table: &[String]) -> DetectionResult {
    match label_table.get(label_id) {
        Some(label) => DetectionResult::Scene(label.clone()),
        None => {
            warn!(
                "Predicted category ID {} out of bounds for labels list (length {}).",
                label_id,
                label_table.len()
            );
            DetectionResult::error(UNKNOWN_SCENE_MESSAGE)
        }
    }
}
