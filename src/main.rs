use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use toolscout_api::{
    auth::AuthKeys,
    config::Config,
    db,
    routes::{create_router, AppState},
    services::{catalog, oracle::OpenAiOracle, recommendation::RecommendationEngine},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    // Storage
    let db_pool = db::create_pool(&config.database_url).await?;
    sqlx::migrate!().run(&db_pool).await?;
    catalog::seed_catalog(&db_pool).await?;

    // Cache; the writer handle must outlive the server
    let redis_client = db::create_redis_client(&config.redis_url)?;
    let (cache, _cache_writer) = db::Cache::new(redis_client).await;

    // Ranking oracle, injected into the engine
    let oracle = Arc::new(OpenAiOracle::new(&config));
    let engine = RecommendationEngine::new(oracle);

    let state = Arc::new(AppState {
        db_pool,
        cache,
        engine,
        auth: AuthKeys::new(&config.jwt_secret, config.token_expiry_minutes),
    });

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(addr = %listener.local_addr()?, "toolscout API listening");
    axum::serve(listener, app).await?;

    Ok(())
}
