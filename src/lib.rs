// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod detection;
pub mod storage;
pub mod version;
pub mod vision;

pub use config::{DetectionSettings, ServiceConfig};
pub use detection::{
    DetectionContext, DetectionMode, DetectionResult, DispatchError, Dispatcher, ResponseEnvelope,
};
pub use vision::{DecodedImage, VisionModelManager};
