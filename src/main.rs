// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Context, Result};
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use visionaid_node::{
    api::{start_server, AppState, DetectionPool, PoolConfig},
    config::ServiceConfig,
    detection::{DetectionContext, Dispatcher},
    storage::InMemoryUserStore,
    version,
    vision::VisionModelManager,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("🚀 Starting VisionAid Node...\n");
    println!("📦 BUILD VERSION: {}", version::VERSION);
    println!("📅 Build Date: {}", version::BUILD_DATE);
    println!();

    let config = ServiceConfig::from_env();
    config
        .validate()
        .map_err(|e| anyhow!("Invalid configuration: {}", e))?;

    // Object and scene models are critical; startup stops here if either fails
    println!("🧠 Loading vision models...");
    let models = VisionModelManager::load(&config).context("Failed to load critical ML models")?;
    println!("✅ Vision models loaded");

    let context = Arc::new(DetectionContext::new(models, config.detection.clone()));
    let pool = DetectionPool::new(
        Dispatcher::new(context),
        PoolConfig {
            max_concurrent: config.max_concurrent_detections,
        },
    );
    let state = AppState::new(
        pool,
        Arc::new(InMemoryUserStore::new()),
        config.max_message_bytes,
    );

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.bind_address()))?;

    let separator = "=".repeat(60);
    println!("\n{}", separator);
    println!("🎉 VisionAid Node is running!");
    println!("{}", separator);
    println!("API Port:       {}", config.port);
    println!("OCR Languages:  {}", config.detection.supported_languages.join(", "));
    println!("Workers:        {}", config.max_concurrent_detections);
    println!("\nAPI Endpoints:");
    println!("  Health:       http://localhost:{}/health", config.port);
    println!("  WebSocket:    ws://localhost:{}/v1/ws", config.port);
    println!("  User info:    GET http://localhost:{}/get_user_info?email=", config.port);
    println!("\nPress Ctrl+C to shutdown...");
    println!("{}\n", separator);

    tokio::select! {
        result = start_server(addr, state) => {
            result.context("API server failed")?;
        }
        _ = signal::ctrl_c() => {
            println!("\n⏹️  Shutting down...");
        }
    }

    println!("👋 Goodbye!");
    Ok(())
}
