// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text region detection (DB-style probability map)
//!
//! The model emits a per-pixel text probability map; regions are found by
//! thresholding and 4-connected flood fill, then mapped back to the source
//! frame. Detection is language-agnostic and shared by every reader.

use anyhow::{Context, Result};
use image::RgbImage;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::preprocessing::preprocess_for_detection;
use crate::vision::providers::lock_session;

/// Pixels below this count are treated as noise
const MIN_REGION_PIXELS: usize = 10;

/// DB maps shrink text kernels; grow boxes back by this fraction of height
const UNCLIP_RATIO: f32 = 0.5;

/// Text region in source-image pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Clone)]
pub struct TextRegionDetector {
    session: Arc<Mutex<Session>>,
    input_name: String,
    threshold: f32,
}

impl std::fmt::Debug for TextRegionDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextRegionDetector")
            .field("input_name", &self.input_name)
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

impl TextRegionDetector {
    pub fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let model_path = model_path.as_ref();
        if !model_path.exists() {
            anyhow::bail!("OCR detection model not found: {}", model_path.display());
        }

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .commit_from_file(model_path)
            .with_context(|| {
                format!("Failed to load OCR detection model from {}", model_path.display())
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "x".to_string());

        info!("✅ OCR detection model loaded from {}", model_path.display());

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            threshold: 0.3,
        })
    }

    /// Find text regions, ordered top-to-bottom then left-to-right
    pub fn detect(&self, image: &RgbImage) -> Result<Vec<TextRegion>> {
        let (input, scale) = preprocess_for_detection(image);

        let mut session = lock_session(&self.session, "OCR detection");
        let input_value = Value::from_array(input).context("Failed to create input tensor")?;
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_value])
            .context("OCR detection inference failed")?;
        let map = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract probability map")?;

        let shape = map.shape().to_vec();
        let (map_h, map_w) = match shape.as_slice() {
            [1, 1, h, w] | [1, h, w] => (*h, *w),
            _ => anyhow::bail!("Unexpected probability map shape: {:?}", shape),
        };
        let probs: Vec<f32> = map.iter().copied().collect();

        let (img_w, img_h) = image.dimensions();
        let regions = find_regions(&probs, map_w, map_h, self.threshold)
            .into_iter()
            .filter_map(|r| r.to_source(scale, img_w, img_h))
            .collect::<Vec<_>>();
        debug!("OCR detection found {} regions", regions.len());
        Ok(regions)
    }
}

/// Region in probability-map coordinates (inclusive bounds)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapRegion {
    pub min_x: usize,
    pub min_y: usize,
    pub max_x: usize,
    pub max_y: usize,
}

impl MapRegion {
    /// Map to source pixels, growing the box to undo DB shrinkage
    fn to_source(&self, scale: f32, img_w: u32, img_h: u32) -> Option<TextRegion> {
        let pad = ((self.max_y - self.min_y + 1) as f32 * UNCLIP_RATIO).round();
        let x1 = ((self.min_x as f32 - pad) / scale).max(0.0) as u32;
        let y1 = ((self.min_y as f32 - pad) / scale).max(0.0) as u32;
        let x2 = (((self.max_x + 1) as f32 + pad) / scale).min(img_w as f32) as u32;
        let y2 = (((self.max_y + 1) as f32 + pad) / scale).min(img_h as f32) as u32;
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(TextRegion {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
        })
    }
}

/// Threshold the map and collect 4-connected regions
pub fn find_regions(probs: &[f32], width: usize, height: usize, threshold: f32) -> Vec<MapRegion> {
    let mut visited = vec![false; width * height];
    let mut regions = Vec::new();

    for start in 0..width * height {
        if visited[start] || probs[start] < threshold {
            continue;
        }

        let mut stack = vec![start];
        visited[start] = true;
        let mut region = MapRegion {
            min_x: start % width,
            min_y: start / width,
            max_x: start % width,
            max_y: start / width,
        };
        let mut count = 0usize;

        while let Some(idx) = stack.pop() {
            let (x, y) = (idx % width, idx / width);
            count += 1;
            region.min_x = region.min_x.min(x);
            region.max_x = region.max_x.max(x);
            region.min_y = region.min_y.min(y);
            region.max_y = region.max_y.max(y);

            let mut visit = |n: usize| {
                if !visited[n] && probs[n] >= threshold {
                    visited[n] = true;
                    stack.push(n);
                }
            };
            if x > 0 {
                visit(idx - 1);
            }
            if x + 1 < width {
                visit(idx + 1);
            }
            if y > 0 {
                visit(idx - width);
            }
            if y + 1 < height {
                visit(idx + width);
            }
        }

        if count >= MIN_REGION_PIXELS {
            regions.push(region);
        }
    }

    regions.sort_by(|a, b| a.min_y.cmp(&b.min_y).then(a.min_x.cmp(&b.min_x)));
    regions
}
