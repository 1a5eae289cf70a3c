// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Frame decoding from transport payloads

use base64::{engine::general_purpose::STANDARD, Engine as _};
use visionaid_node::vision::{decode_payload, ImageError};

use crate::common::{jpeg_data_url, png_base64};

#[test]
fn test_raw_and_data_url_png_decode_identically() {
    let raw = png_base64(6, 3);
    let with_header = format!("data:image/png;base64,{}", raw);

    let a = decode_payload(&raw).unwrap();
    let b = decode_payload(&with_header).unwrap();
    assert_eq!(a, b);
    assert_eq!((a.width(), a.height()), (6, 3));
}

#[test]
fn test_decode_is_repeatable() {
    let payload = jpeg_data_url(16, 16);
    let first = decode_payload(&payload).unwrap();
    let second = decode_payload(&payload).unwrap();
    assert_eq!(first.as_bgr(), second.as_bgr());
}

#[test]
fn test_pixels_are_bgr() {
    // fixture pixel (1, 0) is RGB(16, 0, 200)
    let image = decode_payload(&png_base64(2, 2)).unwrap();
    assert_eq!(image.pixel(1, 0), [200, 0, 16]);
}

#[test]
fn test_invalid_payloads() {
    assert!(matches!(
        decode_payload("not-base64!!"),
        Err(ImageError::InvalidBase64(_))
    ));
    assert!(matches!(decode_payload("   "), Err(ImageError::EmptyData)));

    // valid base64, not an image
    let text = STANDARD.encode(b"hello world, definitely not pixels");
    assert!(decode_payload(&text).is_err());
}
