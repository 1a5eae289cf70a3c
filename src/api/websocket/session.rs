// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-connection lifecycle hooks
//!
//! A session only carries what is needed for logging. Dispatch itself is
//! stateless, so disconnect has nothing to release.

use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::messages::SocketFrame;

#[derive(Debug, Clone)]
pub struct ClientSession {
    pub id: String,
    connected_at: Instant,
    messages_handled: u64,
}

impl Default for ClientSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            connected_at: Instant::now(),
            messages_handled: 0,
        }
    }

    /// Log the connection and build the acknowledgment frame
    pub fn on_connect(&self) -> SocketFrame {
        info!(client_id = %self.id, "Client connected: {}", self.id);
        SocketFrame::connected()
    }

    pub fn record_message(&mut self) {
        self.messages_handled += 1;
    }

    pub fn messages_handled(&self) -> u64 {
        self.messages_handled
    }

    pub fn uptime(&self) -> Duration {
        self.connected_at.elapsed()
    }

    pub fn on_disconnect(&self) {
        info!(
            client_id = %self.id,
            messages = self.messages_handled,
            "Client disconnected: {} after {:.1}s",
            self.id,
            self.uptime().as_secs_f64()
        );
    }

    /// Default error hook: log the failure, return the generic reply
    pub fn on_error(&self, context: &str, detail: &dyn std::fmt::Display) -> SocketFrame {
        error!(client_id = %self.id, "Unhandled {} error for {}: {}", context, self.id, detail);
        SocketFrame::server_error()
    }

    /// Failed sends are logged and swallowed
    pub fn on_send_failure(&self, detail: &dyn std::fmt::Display) {
        warn!(client_id = %self.id, "Failed to emit response to {}: {}", self.id, detail);
    }
}
