use std::sync::Arc;

use axum::{extract::State, Extension, Json};

use crate::{
    auth::AuthUser,
    db::CacheKey,
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{RecommendationRequest, RecommendationResult},
    routes::AppState,
    services::{catalog, recommendation::FALLBACK_REASONING},
};

const RECOMMENDATION_CACHE_TTL: u64 = 900; // 15 minutes

/// Handler for recommendation requests
///
/// Applies the platform pre-filter, rejects an empty candidate set as "no
/// tools match", and otherwise always answers 200: oracle faults are handled
/// inside the engine.
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    _user: AuthUser,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationResult>> {
    if request.requirements.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Requirements text is required".to_string(),
        ));
    }

    tracing::info!(
        request_id = %request_id,
        platform_filters = request.preferred_platforms.len(),
        "Processing recommendation request"
    );

    let key = CacheKey::recommendation(&request.requirements, &request.preferred_platforms);

    // A cache fault must not fail the request; fall through to the engine
    match state
        .cache
        .get_from_cache::<RecommendationResult>(&key)
        .await
    {
        Ok(Some(cached)) => {
            tracing::debug!(request_id = %request_id, "Recommendation served from cache");
            return Ok(Json(cached));
        }
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "Recommendation cache read failed"),
    }

    let candidates =
        catalog::candidates_for_platforms(&state.db_pool, &request.preferred_platforms).await?;

    if candidates.is_empty() {
        return Err(AppError::NotFound(
            "No tools found matching criteria".to_string(),
        ));
    }

    let result = state
        .engine
        .recommend(&request.requirements, candidates)
        .await?;

    // Never pin a degraded response past the outage that produced it
    if result.reasoning != FALLBACK_REASONING {
        state
            .cache
            .set_in_background(&key, &result, RECOMMENDATION_CACHE_TTL);
    }

    tracing::info!(
        request_id = %request_id,
        recommended = result.tools.len(),
        "Recommendation completed"
    );

    Ok(Json(result))
}
