// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod http_server;
pub mod pool;
pub mod users;
pub mod websocket;

pub use errors::{ApiError, ErrorResponse};
pub use http_server::{create_router, start_server, AppState, HealthResponse};
pub use pool::{DetectionPool, PoolConfig, PoolStats};
pub use users::{
    add_test_user_handler, get_user_info_handler, update_customization_handler, AddUserRequest,
    StatusResponse, UpdateCustomizationRequest, UserInfoQuery, UserInfoResponse,
};
