use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{auth::AuthUser, error::AppResult, routes::AppState, services::accounts};

/// Handler for bookmarking a tool
pub async fn add(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(tool_id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    accounts::add_favorite(&state.db_pool, user.user_id, tool_id).await?;
    Ok(Json(json!({ "message": "Added to favorites" })))
}

/// Handler for removing a bookmark
pub async fn remove(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(tool_id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    accounts::remove_favorite(&state.db_pool, user.user_id, tool_id).await?;
    Ok(Json(json!({ "message": "Removed from favorites" })))
}

/// Handler for the caller's bookmarked tools
pub async fn list(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> AppResult<Json<Value>> {
    let tools = accounts::favorite_tools(&state.db_pool, user.user_id).await?;
    Ok(Json(json!({ "tools": tools })))
}
