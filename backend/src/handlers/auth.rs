//! Authentication handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::services::auth::AuthTokens;
use crate::services::AuthService;
use crate::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl From<AuthTokens> for LoginResponse {
    fn from(tokens: AuthTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: tokens.token_type,
            expires_in: tokens.expires_in,
        }
    }
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    shared::validate_email(&body.email).map_err(|message| AppError::validation("email", message))?;

    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let tokens = auth_service.login(&body.email, &body.password).await?;

    Ok(Json(tokens.into()))
}

/// Refresh token endpoint handler
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let tokens = auth_service.refresh_token(&body.refresh_token).await?;

    Ok(Json(tokens.into()))
}
