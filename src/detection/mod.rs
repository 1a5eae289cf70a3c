// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection request dispatch and result normalization

pub mod dispatcher;
pub mod errors;
pub mod objects;
pub mod request;
pub mod result;
pub mod scene;
pub mod text;

pub use dispatcher::{DetectionContext, DispatchStage, Dispatcher};
pub use errors::{DispatchError, GENERIC_SERVER_ERROR};
pub use objects::normalize_objects;
pub use request::{DetectionMode, DetectionRequest, DetectionTask};
pub use result::{Detection, DetectionResult, ResponseEnvelope};
pub use scene::normalize_scene;
pub use text::normalize_text;
