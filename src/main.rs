use std::sync::Arc;

use giligili_api::{
    config::Config,
    db::{create_pool, create_redis_client, Cache, PgHistoryStore},
    routes::{create_router, AppState},
    services::{providers::TwitchProvider, Recommender},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("giligili_api=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let db_pool = create_pool(&config.database_url).await?;
    let redis_client = create_redis_client(&config.redis_url)?;
    let (cache, cache_writer) = Cache::connect(redis_client).await?;

    let content_source = Arc::new(TwitchProvider::new(
        cache,
        config.twitch_client_id.clone(),
        config.twitch_access_token.clone(),
        config.twitch_api_url.clone(),
    ));
    let history_store = Arc::new(PgHistoryStore::new(db_pool));

    let recommender = Recommender::new(content_source.clone(), history_store)
        .with_limits(config.recommendation_limits()?);

    tracing::info!(limits = ?recommender.limits(), "Recommender configured");

    let state = Arc::new(AppState {
        recommender,
        content_source,
    });
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cache_writer.shutdown().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
