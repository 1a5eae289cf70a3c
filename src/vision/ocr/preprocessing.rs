// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the OCR models

use image::{imageops::FilterType, Rgb, RgbImage};
use ndarray::Array4;

/// Square input edge for the text-region detector
pub const DET_INPUT_SIZE: u32 = 640;

/// Recognition model input height
pub const REC_INPUT_HEIGHT: u32 = 48;

/// Widest line crop fed to the recognizer
pub const REC_MAX_WIDTH: u32 = 640;

const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Fit the frame into a `DET_INPUT_SIZE` square anchored top-left, padded
/// with black. Returns the tensor and the scale applied to the source.
pub fn preprocess_for_detection(image: &RgbImage) -> (Array4<f32>, f32) {
    let (w, h) = image.dimensions();
    let scale = (DET_INPUT_SIZE as f32 / w as f32).min(DET_INPUT_SIZE as f32 / h as f32);
    let new_w = ((w as f32 * scale).round() as u32).clamp(1, DET_INPUT_SIZE);
    let new_h = ((h as f32 * scale).round() as u32).clamp(1, DET_INPUT_SIZE);
    let resized = image::imageops::resize(image, new_w, new_h, FilterType::Triangle);

    let mut canvas = RgbImage::from_pixel(DET_INPUT_SIZE, DET_INPUT_SIZE, Rgb([0, 0, 0]));
    image::imageops::overlay(&mut canvas, &resized, 0, 0);

    (normalize(&canvas), scale)
}

/// Resize a line crop to `REC_INPUT_HEIGHT`, keeping aspect ratio
pub fn preprocess_for_recognition(crop: &RgbImage) -> Array4<f32> {
    let (w, h) = crop.dimensions();
    let scale = REC_INPUT_HEIGHT as f32 / h.max(1) as f32;
    let new_w = ((w as f32 * scale).round() as u32).clamp(4, REC_MAX_WIDTH);
    let resized = image::imageops::resize(crop, new_w, REC_INPUT_HEIGHT, FilterType::Lanczos3);
    normalize(&resized)
}

fn normalize(image: &RgbImage) -> Array4<f32> {
    let (w, h) = image.dimensions();
    let mut tensor = Array4::zeros((1, 3, h as usize, w as usize));
    for (x, y, pixel) in image.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = (pixel[c] as f32 / 255.0 - MEAN[c]) / STD[c];
        }
    }
    tensor
}
