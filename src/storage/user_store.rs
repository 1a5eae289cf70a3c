// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! User profile records and customization settings

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Fixed length of the customization string
pub const CUSTOMIZATION_LEN: usize = 255;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UserStoreError {
    #[error("User with email '{0}' not found")]
    NotFound(String),

    #[error("User with email '{0}' already exists")]
    AlreadyExists(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub customization: String,
}

/// Fields needed to register a user
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub fn default_customization() -> String {
    "0".repeat(CUSTOMIZATION_LEN)
}

/// Right-pad with '0' and cut to [`CUSTOMIZATION_LEN`] characters
pub fn normalize_customization(raw: &str) -> String {
    raw.chars()
        .chain(std::iter::repeat('0'))
        .take(CUSTOMIZATION_LEN)
        .collect()
}

/// Record store behind the profile routes
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Option<User>;

    async fn create_user(&self, user: NewUser) -> Result<User, UserStoreError>;

    /// Replace the customization string, returning the stored value
    async fn update_customization(
        &self,
        email: &str,
        customization: &str,
    ) -> Result<String, UserStoreError>;
}

/// In-process store keyed by email
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.users.read().await.get(email).cloned()
    }

    async fn create_user(&self, user: NewUser) -> Result<User, UserStoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.email) {
            return Err(UserStoreError::AlreadyExists(user.email));
        }

        let record = User {
            id: users.len() as u64 + 1,
            name: user.name,
            email: user.email.clone(),
            password: user.password,
            customization: default_customization(),
        };
        users.insert(user.email, record.clone());
        info!("Created user {} ({})", record.id, record.email);
        Ok(record)
    }

    async fn update_customization(
        &self,
        email: &str,
        customization: &str,
    ) -> Result<String, UserStoreError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(email)
            .ok_or_else(|| UserStoreError::NotFound(email.to_string()))?;

        user.customization = normalize_customization(customization);
        debug!("Updated customization for {}", email);
        Ok(user.customization.clone())
    }
}
