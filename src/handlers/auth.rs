use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::models::{
    AppError, AuthResponse, LoginRequest, RefreshRequest, RefreshResponse, RegisterRequest,
};
use crate::AppState;

/// Register a new user
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let response = state.user_service.register(req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Login user
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let response = state.user_service.login(req).await?;
    Ok(Json(response))
}

/// Refresh access token
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, AppError> {
    let response = state.user_service.refresh(req.refresh_token).await?;
    Ok(Json(response))
}
