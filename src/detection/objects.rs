// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection normalizer: enumerate-top-N and focus-on-one

use super::result::{Detection, DetectionResult};
use crate::vision::RawDetection;

pub const NO_OBJECTS_MESSAGE: &str = "No objects detected";

/// Convert raw predictions into a result
///
/// Predictions are expected to be at or above the confidence threshold
/// already; the provider applies it.
pub fn normalize_objects(
    predictions: Vec<RawDetection>,
    focus_object: Option<&str>,
    max_results: usize,
) -> DetectionResult {
    match focus_object {
        Some(target) => focus(&predictions, target),
        None => enumerate(predictions, max_results),
    }
}

/// Highest-confidence match; ties keep the lowest index
fn focus(predictions: &[RawDetection], target: &str) -> DetectionResult {
    let target = target.trim();
    let mut best: Option<&RawDetection> = None;

    for p in predictions
        .iter()
        .filter(|p| p.class_name.eq_ignore_ascii_case(target))
    {
        if best.map_or(true, |b| p.confidence > b.confidence) {
            best = Some(p);
        }
    }

    match best {
        Some(p) => DetectionResult::Found(Detection::from_box(
            p.class_name.clone(),
            p.confidence,
            &p.bbox,
        )),
        None => DetectionResult::NotFound(target.to_string()),
    }
}

fn enumerate(mut predictions: Vec<RawDetection>, max_results: usize) -> DetectionResult {
    if predictions.is_empty() {
        return DetectionResult::None(NO_OBJECTS_MESSAGE.to_string());
    }

    // stable: equal confidences keep provider order
    predictions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    predictions.truncate(max_results);

    DetectionResult::Objects(
        predictions
            .into_iter()
            .map(|p| Detection::from_box(p.class_name, p.confidence, &p.bbox))
            .collect(),
    )
}
