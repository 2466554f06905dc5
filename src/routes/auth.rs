use std::sync::Arc;

use axum::{extract::State, Json};

use crate::{
    auth::{verify_password, AuthUser},
    error::{AppError, AppResult},
    models::{LoginRequest, RegisterRequest, TokenResponse, User},
    routes::AppState,
    services::accounts,
};

/// Handler for account registration
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<Json<TokenResponse>> {
    let user = accounts::create_user(&state.db_pool, request).await?;
    let token = state.auth.issue(user.id)?;
    Ok(Json(TokenResponse::bearer(token)))
}

/// Handler for login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let user = accounts::find_user_by_email(&state.db_pool, &request.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    if !verify_password(&request.password, &user.password_hash)? {
        return Err(AppError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let token = state.auth.issue(user.id)?;
    Ok(Json(TokenResponse::bearer(token)))
}

/// Handler returning the authenticated caller's account
pub async fn me(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> AppResult<Json<User>> {
    let user = accounts::find_user_by_id(&state.db_pool, user.user_id).await?;
    Ok(Json(user))
}
