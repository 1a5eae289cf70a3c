// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Bounded pool of blocking detection workers

use anyhow::{anyhow, Result};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::detection::{DetectionMode, Dispatcher, ResponseEnvelope};

#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_concurrent: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { max_concurrent: 4 }
    }
}

#[derive(Debug, Clone)]
pub struct PoolStats {
    pub max_concurrent: usize,
    pub available: usize,
}

/// Runs dispatches on the blocking thread pool, at most `max_concurrent` at once
#[derive(Debug, Clone)]
pub struct DetectionPool {
    dispatcher: Dispatcher,
    semaphore: Arc<Semaphore>,
    max_concurrent: usize,
}

impl DetectionPool {
    pub fn new(dispatcher: Dispatcher, config: PoolConfig) -> Self {
        let max_concurrent = config.max_concurrent.max(1);
        Self {
            dispatcher,
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            max_concurrent: self.max_concurrent,
            available: self.semaphore.available_permits(),
        }
    }

    /// Wait for a free worker, then dispatch on it
    ///
    /// An error here means the worker itself died (panic outside the
    /// dispatcher's own guard, or runtime shutdown).
    pub async fn run(
        &self,
        client_id: String,
        data: Value,
        forced_mode: Option<DetectionMode>,
    ) -> Result<ResponseEnvelope> {
        let _permit = self.semaphore.acquire().await?;

        let dispatcher = self.dispatcher.clone();
        tokio::task::spawn_blocking(move || dispatcher.dispatch(&client_id, &data, forced_mode))
            .await
            .map_err(|e| anyhow!("Detection worker failed: {}", e))
    }
}
