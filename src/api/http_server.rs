// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::pool::DetectionPool;
use super::users::{add_test_user_handler, get_user_info_handler, update_customization_handler};
use super::websocket::websocket_handler;
use crate::storage::UserStore;
use crate::version::VERSION_NUMBER;
use crate::vision::VisionModelInfo;

#[derive(Clone)]
pub struct AppState {
    pub pool: DetectionPool,
    pub users: Arc<dyn UserStore>,
    pub max_message_bytes: usize,
}

impl AppState {
    pub fn new(pool: DetectionPool, users: Arc<dyn UserStore>, max_message_bytes: usize) -> Self {
        Self {
            pool,
            users,
            max_message_bytes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub models: Vec<VisionModelInfo>,
    pub ocr_languages: Vec<String>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        // Health check
        .route("/health", get(health_handler))
        // Detection socket
        .route("/v1/ws", get(websocket_handler))
        // User profile
        .route("/update_customization", post(update_customization_handler))
        .route("/get_user_info", get(get_user_info_handler))
        .route("/add_test_user", post(add_test_user_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("API server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn index_handler() -> &'static str {
    "Backend is running. WebSocket connections accepted."
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let models = &state.pool.dispatcher().context().models;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: VERSION_NUMBER.to_string(),
        models: models.list_models(),
        ocr_languages: models.text().loaded_languages(),
    })
}
