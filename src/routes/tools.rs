use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    cached,
    db::CacheKey,
    error::AppResult,
    models::{NewTool, Tool},
    routes::AppState,
    services::catalog::{self, ToolFilter},
};

const CATEGORY_CACHE_TTL: u64 = 300; // 5 minutes

/// Handler for catalog listing with optional filters
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ToolFilter>,
) -> AppResult<Json<Vec<Tool>>> {
    let tools = catalog::list_tools(&state.db_pool, &filter).await?;
    Ok(Json(tools))
}

/// Handler for catalog insertion
pub async fn create(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Json(payload): Json<NewTool>,
) -> AppResult<(StatusCode, Json<Tool>)> {
    let tool = catalog::insert_tool(&state.db_pool, payload).await?;
    Ok((StatusCode::CREATED, Json(tool)))
}

/// Handler for a single catalog entry
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(tool_id): Path<Uuid>,
) -> AppResult<Json<Tool>> {
    let tool = catalog::get_tool(&state.db_pool, tool_id).await?;
    Ok(Json(tool))
}

/// Handler for catalog removal
pub async fn delete(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(tool_id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    catalog::delete_tool(&state.db_pool, tool_id).await?;
    Ok(Json(json!({ "message": "Tool deleted successfully" })))
}

/// Handler for the distinct category listing
pub async fn categories(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    let categories: Vec<String> = cached!(
        state.cache,
        CacheKey::Categories,
        CATEGORY_CACHE_TTL,
        async { catalog::distinct_categories(&state.db_pool).await }
    )?;

    Ok(Json(json!({ "categories": categories })))
}
