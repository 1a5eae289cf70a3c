// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLO object detector on ONNX Runtime
//!
//! Supports the two common export layouts:
//! - YOLOv5: `[1, N, 5 + C]` rows of `cx, cy, w, h, objectness, class scores...`
//! - YOLOv8: `[1, 4 + C, N]` columns of `cx, cy, w, h, class scores...`
//!
//! Boxes come back normalised to the source image so the caller never sees
//! letterbox geometry.

use anyhow::{Context, Result};
use image::{imageops::FilterType, Rgb, RgbImage};
use ndarray::{Array4, ArrayViewD, IxDyn};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::image_utils::DecodedImage;
use super::providers::{lock_session, NormalizedBox, ObjectClassifier, RawDetection};

/// Square model input edge
pub const YOLO_INPUT_SIZE: u32 = 640;

/// Letterbox padding colour used by the YOLO training pipeline
const PAD_VALUE: u8 = 114;

/// Scale and padding applied when fitting the frame into the model input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
}

/// A decoded box in model-input pixel space, before NMS
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub class_id: usize,
    pub score: f32,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Candidate {
    fn area(&self) -> f32 {
        (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0)
    }

    pub fn iou(&self, other: &Candidate) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);
        let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        let union = self.area() + other.area() - inter;
        if union <= 0.0 {
            0.0
        } else {
            inter / union
        }
    }
}

/// ONNX YOLO detector
#[derive(Clone)]
pub struct YoloObjectDetector {
    session: Arc<Mutex<Session>>,
    input_name: String,
    class_names: Arc<Vec<String>>,
    iou_threshold: f32,
}

impl std::fmt::Debug for YoloObjectDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloObjectDetector")
            .field("input_name", &self.input_name)
            .field("classes", &self.class_names.len())
            .field("iou_threshold", &self.iou_threshold)
            .finish_non_exhaustive()
    }
}

impl YoloObjectDetector {
    /// Load the detector. `class_names` must list every class the model
    /// emits, in output order.
    pub fn new<P: AsRef<Path>>(
        model_path: P,
        class_names: Vec<String>,
        iou_threshold: f32,
    ) -> Result<Self> {
        let model_path = model_path.as_ref();
        if !model_path.exists() {
            anyhow::bail!("Object detection model not found: {}", model_path.display());
        }

        info!("Loading object detection model from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .with_context(|| {
                format!("Failed to load object model from {}", model_path.display())
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        info!(
            "✅ Object detection model loaded ({} classes, input '{}')",
            class_names.len(),
            input_name
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            class_names: Arc::new(class_names),
            iou_threshold: iou_threshold.clamp(0.0, 1.0),
        })
    }

    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }
}

impl ObjectClassifier for YoloObjectDetector {
    fn classify_objects(
        &self,
        image: &DecodedImage,
        confidence_threshold: f32,
    ) -> Result<Vec<RawDetection>> {
        let (input, letterbox) = preprocess(image, YOLO_INPUT_SIZE);

        let mut session = lock_session(&self.session, "Object detection");
        let input_value = Value::from_array(input).context("Failed to create input tensor")?;
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_value])
            .context("Object detection inference failed")?;
        let output = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        let candidates =
            decode_output(output.view(), self.class_names.len(), confidence_threshold)?;
        let kept = non_max_suppression(candidates, self.iou_threshold);
        debug!("Object detection kept {} boxes after NMS", kept.len());

        Ok(kept
            .into_iter()
            .filter_map(|c| {
                let class_name = self.class_names.get(c.class_id)?.clone();
                Some(RawDetection {
                    class_name,
                    confidence: c.score,
                    bbox: to_normalized(&c, letterbox, image.width(), image.height()),
                })
            })
            .collect())
    }
}

/// Letterbox the frame into a `[1, 3, size, size]` RGB tensor scaled to [0, 1]
pub fn preprocess(image: &DecodedImage, size: u32) -> (Array4<f32>, Letterbox) {
    let rgb = image.to_rgb_image();
    let (w, h) = rgb.dimensions();
    let letterbox = letterbox_geometry(w, h, size);

    let new_w = ((w as f32 * letterbox.scale).round() as u32).clamp(1, size);
    let new_h = ((h as f32 * letterbox.scale).round() as u32).clamp(1, size);
    let resized = image::imageops::resize(&rgb, new_w, new_h, FilterType::Triangle);

    let mut canvas = RgbImage::from_pixel(size, size, Rgb([PAD_VALUE; 3]));
    image::imageops::overlay(
        &mut canvas,
        &resized,
        letterbox.pad_x as i64,
        letterbox.pad_y as i64,
    );

    let side = size as usize;
    let mut tensor = Array4::zeros((1, 3, side, side));
    for (x, y, pixel) in canvas.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
        }
    }
    (tensor, letterbox)
}

pub fn letterbox_geometry(width: u32, height: u32, size: u32) -> Letterbox {
    let scale = (size as f32 / width as f32).min(size as f32 / height as f32);
    let new_w = (width as f32 * scale).round();
    let new_h = (height as f32 * scale).round();
    Letterbox {
        scale,
        pad_x: ((size as f32 - new_w) / 2.0).floor(),
        pad_y: ((size as f32 - new_h) / 2.0).floor(),
    }
}

/// Decode raw model output into candidates with `score >= threshold`
pub fn decode_output(
    output: ArrayViewD<f32>,
    num_classes: usize,
    threshold: f32,
) -> Result<Vec<Candidate>> {
    let shape = output.shape().to_vec();
    if shape.len() != 3 || shape[0] != 1 {
        anyhow::bail!("Unexpected detector output shape: {:?}", shape);
    }

    // v5 rows carry an objectness column, v8 columns do not.
    let (rows, transposed, has_objectness) = if shape[2] == num_classes + 5 {
        (shape[1], false, true)
    } else if shape[1] == num_classes + 4 {
        (shape[2], true, false)
    } else {
        anyhow::bail!(
            "Detector output {:?} does not match {} configured classes",
            shape,
            num_classes
        );
    };

    let at = |row: usize, col: usize| -> f32 {
        if transposed {
            output[IxDyn(&[0, col, row])]
        } else {
            output[IxDyn(&[0, row, col])]
        }
    };
    let class_offset = if has_objectness { 5 } else { 4 };

    let mut candidates = Vec::new();
    for row in 0..rows {
        let objectness = if has_objectness { at(row, 4) } else { 1.0 };
        if objectness < threshold {
            continue;
        }

        let mut best_class = 0usize;
        let mut best_score = f32::NEG_INFINITY;
        for c in 0..num_classes {
            let s = at(row, class_offset + c);
            if s > best_score {
                best_score = s;
                best_class = c;
            }
        }

        let score = objectness * best_score;
        if score < threshold {
            continue;
        }

        let (cx, cy, w, h) = (at(row, 0), at(row, 1), at(row, 2), at(row, 3));
        candidates.push(Candidate {
            class_id: best_class,
            score,
            x1: cx - w / 2.0,
            y1: cy - h / 2.0,
            x2: cx + w / 2.0,
            y2: cy + h / 2.0,
        });
    }
    Ok(candidates)
}

/// Greedy per-class NMS, highest score first
pub fn non_max_suppression(mut candidates: Vec<Candidate>, iou_threshold: f32) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut kept: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let suppressed = kept
            .iter()
            .any(|k| k.class_id == candidate.class_id && k.iou(&candidate) > iou_threshold);
        if !suppressed {
            kept.push(candidate);
        }
    }
    kept
}

/// Undo the letterbox and normalise to the source frame
pub fn to_normalized(c: &Candidate, lb: Letterbox, width: u32, height: u32) -> NormalizedBox {
    let nx = |x: f32| (((x - lb.pad_x) / lb.scale) / width as f32).clamp(0.0, 1.0);
    let ny = |y: f32| (((y - lb.pad_y) / lb.scale) / height as f32).clamp(0.0, 1.0);
    NormalizedBox {
        x1: nx(c.x1),
        y1: ny(c.y1),
        x2: nx(c.x2),
        y2: ny(c.y2),
    }
}
