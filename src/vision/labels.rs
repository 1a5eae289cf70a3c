// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Label tables for the object detector and the scene classifier

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, warn};

/// Number of Places365 categories
pub const PLACES365_CLASSES: usize = 365;

/// COCO-80 class names in YOLOv5 output order
pub const COCO_CLASSES: [&str; 80] = [
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "stop sign", "parking meter", "bench", "bird", "cat", "dog",
    "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "backpack", "umbrella",
    "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball", "kite",
    "baseball bat", "baseball glove", "skateboard", "surfboard", "tennis racket", "bottle",
    "wine glass", "cup", "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich",
    "orange", "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "couch",
    "potted plant", "bed", "dining table", "toilet", "tv", "laptop", "mouse", "remote",
    "keyboard", "cell phone", "microwave", "oven", "toaster", "sink", "refrigerator", "book",
    "clock", "vase", "scissors", "teddy bear", "hair drier", "toothbrush",
];

/// Object class names: one per line from `path`, or the built-in COCO list
pub fn load_object_classes(path: Option<&Path>) -> Result<Vec<String>> {
    let Some(path) = path else {
        return Ok(COCO_CLASSES.iter().map(|s| s.to_string()).collect());
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read class names from {}", path.display()))?;
    let classes: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();

    if classes.is_empty() {
        anyhow::bail!("Class names file {} is empty", path.display());
    }
    debug!("Loaded {} object classes from {}", classes.len(), path.display());
    Ok(classes)
}

/// Parse one line of `categories_places365.txt`.
///
/// `/a/apartment_building/outdoor 8` becomes `apartment_building outdoor`.
pub fn parse_places_line(line: &str) -> Option<String> {
    let path = line.split_whitespace().next()?;
    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
    // First component is the single-letter bucket.
    let name = if parts.len() > 1 { &parts[1..] } else { &parts[..] };
    if name.is_empty() {
        return None;
    }
    Some(name.join(" "))
}

/// Places365 label table. Falls back to `Label <i>` entries when the file
/// cannot be read so a missing label file never blocks startup.
pub fn load_scene_labels(path: &Path) -> Vec<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let labels: Vec<String> = content.lines().filter_map(parse_places_line).collect();
            if labels.is_empty() {
                warn!("Scene label file {} has no labels, using placeholders", path.display());
                return fallback_scene_labels();
            }
            debug!("Loaded {} Places365 labels", labels.len());
            labels
        }
        Err(e) => {
            warn!(
                "Failed to read scene labels from {}: {}. Using placeholders",
                path.display(),
                e
            );
            fallback_scene_labels()
        }
    }
}

pub fn fallback_scene_labels() -> Vec<String> {
    (0..PLACES365_CLASSES).map(|i| format!("Label {}", i)).collect()
}
