// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Places365 scene classifier (ResNet-50 exported to ONNX)

use anyhow::{anyhow, Context, Result};
use image::imageops::FilterType;
use ndarray::Array4;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

use super::image_utils::DecodedImage;
use super::providers::{lock_session, SceneClassifier, ScenePrediction};

const RESIZE_TO: u32 = 256;
const CROP_SIZE: u32 = 224;

/// ImageNet normalisation
const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const STD: [f32; 3] = [0.229, 0.224, 0.225];

#[derive(Clone)]
pub struct PlacesSceneClassifier {
    session: Arc<Mutex<Session>>,
    input_name: String,
}

impl std::fmt::Debug for PlacesSceneClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacesSceneClassifier")
            .field("input_name", &self.input_name)
            .finish_non_exhaustive()
    }
}

impl PlacesSceneClassifier {
    pub fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let model_path = model_path.as_ref();
        if !model_path.exists() {
            anyhow::bail!("Scene model not found: {}", model_path.display());
        }

        info!("Loading Places365 scene model from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .with_context(|| format!("Failed to load scene model from {}", model_path.display()))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "input".to_string());

        info!("✅ Places365 scene model loaded");

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
        })
    }
}

impl SceneClassifier for PlacesSceneClassifier {
    fn classify_scene(&self, image: &DecodedImage) -> Result<ScenePrediction> {
        let input = preprocess(image);

        let mut session = lock_session(&self.session, "Scene classification");
        let input_value = Value::from_array(input).context("Failed to create input tensor")?;
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_value])
            .context("Scene inference failed")?;
        let logits = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        let logits: Vec<f32> = logits.iter().copied().collect();
        top1(&logits).ok_or_else(|| anyhow!("Scene model returned no logits"))
    }
}

/// Resize to 256x256, centre-crop 224, normalise, NCHW
pub fn preprocess(image: &DecodedImage) -> Array4<f32> {
    let rgb = image.to_rgb_image();
    let resized = image::imageops::resize(&rgb, RESIZE_TO, RESIZE_TO, FilterType::Triangle);
    let offset = (RESIZE_TO - CROP_SIZE) / 2;

    let side = CROP_SIZE as usize;
    let mut tensor = Array4::zeros((1, 3, side, side));
    for y in 0..CROP_SIZE {
        for x in 0..CROP_SIZE {
            let pixel = resized.get_pixel(x + offset, y + offset);
            for c in 0..3 {
                tensor[[0, c, y as usize, x as usize]] =
                    (pixel[c] as f32 / 255.0 - MEAN[c]) / STD[c];
            }
        }
    }
    tensor
}

/// Softmax over logits, then argmax
pub fn top1(logits: &[f32]) -> Option<ScenePrediction> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() {
        return None;
    }
    let exp: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f32 = exp.iter().sum();

    let (label_id, best) = exp
        .iter()
        .enumerate()
        .fold((0usize, f32::NEG_INFINITY), |acc, (i, &p)| {
            if p > acc.1 {
                (i, p)
            } else {
                acc
            }
        });

    Some(ScenePrediction {
        label_id,
        confidence: best / sum,
    })
}
