use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::AppResult,
    models::{NewReview, Review},
    routes::AppState,
    services::reviews,
};

/// Handler for recording a review
pub async fn create(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(payload): Json<NewReview>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let review = reviews::create_review(&state.db_pool, user.user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// Handler for a tool's reviews
pub async fn list_for_tool(
    State(state): State<Arc<AppState>>,
    Path(tool_id): Path<Uuid>,
) -> AppResult<Json<Vec<Review>>> {
    let reviews = reviews::reviews_for_tool(&state.db_pool, tool_id).await?;
    Ok(Json(reviews))
}
