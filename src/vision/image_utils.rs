// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Camera frame decoding
//!
//! Turns the opaque transport payload (raw base64, optionally prefixed with a
//! `data:image/...;base64,` header) into a [`DecodedImage`] in BGR-interleaved
//! 8-bit layout.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat, RgbImage};
use thiserror::Error;

/// Errors raised while decoding a camera frame
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image data is empty")]
    EmptyData,

    #[error("Invalid base64 encoding: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),
}

/// A decoded frame, BGR-interleaved, 3 bytes per pixel, row-major.
///
/// Never mutated after decode; providers read it and convert to whatever
/// layout their model expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl DecodedImage {
    /// Build from a BGR buffer. Returns `None` when the buffer length does not
    /// match `width * height * 3`.
    pub fn from_bgr(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if width == 0 || height == 0 || data.len() != width as usize * height as usize * 3 {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    fn from_dynamic(image: DynamicImage) -> Result<Self, ImageError> {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();
        let mut data = rgb.into_raw();
        for px in data.chunks_exact_mut(3) {
            px.swap(0, 2);
        }
        Self::from_bgr(width, height, data)
            .ok_or_else(|| ImageError::DecodeFailed("image has no pixels".to_string()))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw BGR bytes
    pub fn as_bgr(&self) -> &[u8] {
        &self.data
    }

    /// BGR triple at `(x, y)`
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = (y as usize * self.width as usize + x as usize) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Copy into an RGB image for model preprocessing
    pub fn to_rgb_image(&self) -> RgbImage {
        let mut rgb = self.data.clone();
        for px in rgb.chunks_exact_mut(3) {
            px.swap(0, 2);
        }
        // Length is checked on construction.
        RgbImage::from_raw(self.width, self.height, rgb)
            .unwrap_or_else(|| RgbImage::new(self.width, self.height))
    }
}

/// Strip an optional data-URL header: everything before the first comma.
pub fn strip_data_url_header(payload: &str) -> &str {
    match payload.split_once(',') {
        Some((_, encoded)) => encoded,
        None => payload,
    }
}

/// Decode a transport payload into a bitmap
///
/// # Example
/// ```ignore
/// let image = decode_payload("data:image/jpeg;base64,/9j/4AAQ...")?;
/// println!("{}x{}", image.width(), image.height());
/// ```
pub fn decode_payload(payload: &str) -> Result<DecodedImage, ImageError> {
    let encoded = strip_data_url_header(payload).trim();
    if encoded.is_empty() {
        return Err(ImageError::EmptyData);
    }

    // MIME-style encoders wrap lines at 76 columns
    let compact: String = encoded.split_ascii_whitespace().collect();
    let bytes = STANDARD.decode(compact)?;
    decode_image_bytes(&bytes)
}

/// Decode compressed image bytes (JPEG/PNG and the other formats sniffed by
/// [`detect_format`])
pub fn decode_image_bytes(bytes: &[u8]) -> Result<DecodedImage, ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::EmptyData);
    }

    let format = detect_format(bytes)?;
    let image = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| ImageError::DecodeFailed(e.to_string()))?;

    DecodedImage::from_dynamic(image)
}

/// Detect image format from magic bytes
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, ImageError> {
    if bytes.len() < 4 {
        return Err(ImageError::UnsupportedFormat);
    }

    match bytes {
        [0x89, 0x50, 0x4E, 0x47, ..] => Ok(ImageFormat::Png),
        [0xFF, 0xD8, 0xFF, ..] => Ok(ImageFormat::Jpeg),
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Ok(ImageFormat::WebP),
        [0x47, 0x49, 0x46, 0x38, x, ..] if *x == 0x37 || *x == 0x39 => Ok(ImageFormat::Gif),
        [0x42, 0x4D, ..] => Ok(ImageFormat::Bmp),
        _ => Err(ImageError::UnsupportedFormat),
    }
}
