use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware as axum_middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    auth::AuthKeys,
    db::Cache,
    middleware::{make_span_with_request_id, request_id_middleware},
    services::recommendation::RecommendationEngine,
};

pub mod auth;
pub mod favorites;
pub mod recommendations;
pub mod reviews;
pub mod tools;

/// Shared application state, assembled once at bootstrap
pub struct AppState {
    pub db_pool: PgPool,
    pub cache: Cache,
    pub engine: RecommendationEngine,
    pub auth: AuthKeys,
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(axum_middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Accounts
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
        // Catalog
        .route("/tools", get(tools::list).post(tools::create))
        .route("/tools/:tool_id", get(tools::get).delete(tools::delete))
        .route("/categories", get(tools::categories))
        // Reviews
        .route("/reviews", post(reviews::create))
        .route("/tools/:tool_id/reviews", get(reviews::list_for_tool))
        // Recommendations
        .route("/recommendations", post(recommendations::recommend))
        // Favorites
        .route("/favorites", get(favorites::list))
        .route(
            "/favorites/:tool_id",
            post(favorites::add).delete(favorites::remove),
        )
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
