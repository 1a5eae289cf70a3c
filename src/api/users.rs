// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! User profile endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::errors::ApiError;
use super::http_server::AppState;
use crate::storage::NewUser;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCustomizationRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub customization: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserInfoQuery {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
}

/// Profile view; never includes the password
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserInfoResponse {
    pub success: bool,
    pub name: String,
    pub email: String,
    pub customization: String,
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// POST /update_customization
///
/// # Errors
/// - 400: `email` or `customization` missing
/// - 404: unknown user
pub async fn update_customization_handler(
    State(state): State<AppState>,
    Json(request): Json<UpdateCustomizationRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let (Some(email), Some(customization)) = (required(request.email), request.customization)
    else {
        warn!("update_customization called without email or customization");
        return Err(ApiError::InvalidRequest(
            "Email and customization required".to_string(),
        ));
    };

    state
        .users
        .update_customization(&email, &customization)
        .await?;
    info!("Customization updated for user: {}", email);

    Ok(Json(StatusResponse {
        success: true,
        message: "Customization updated".to_string(),
    }))
}

/// GET /get_user_info?email=
pub async fn get_user_info_handler(
    State(state): State<AppState>,
    Query(query): Query<UserInfoQuery>,
) -> Result<Json<UserInfoResponse>, ApiError> {
    let email = required(query.email).ok_or_else(|| ApiError::ValidationError {
        field: "email".to_string(),
        message: "Email parameter required".to_string(),
    })?;

    let user = state
        .users
        .find_user_by_email(&email)
        .await
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    info!("User info retrieved for: {}", email);

    Ok(Json(UserInfoResponse {
        success: true,
        name: user.name,
        email: user.email,
        customization: user.customization,
    }))
}

/// POST /add_test_user
///
/// Stores the password as given; this route exists for manual testing.
pub async fn add_test_user_handler(
    State(state): State<AppState>,
    Json(request): Json<AddUserRequest>,
) -> Result<(StatusCode, Json<StatusResponse>), ApiError> {
    let (Some(name), Some(email), Some(password)) = (
        required(request.name),
        required(request.email),
        required(request.password),
    ) else {
        return Err(ApiError::InvalidRequest("Missing fields".to_string()));
    };

    state
        .users
        .create_user(NewUser {
            name,
            email: email.clone(),
            password,
        })
        .await?;
    info!("Test user added: {}", email);

    Ok((
        StatusCode::CREATED,
        Json(StatusResponse {
            success: true,
            message: "Test user added".to_string(),
        }),
    ))
}
