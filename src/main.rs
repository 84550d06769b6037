//! Entry point: load config, wire dependencies, and run the server.

use std::sync::Arc;

use starthub::auth::TokenService;
use starthub::config::Config;
use starthub::db::{self, PgRepository};
use starthub::services::PexelsClient;
use starthub::{create_app, with_request_timeout, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.uses_dev_jwt_secret() {
        tracing::warn!("JWT_SECRET not set; using the development secret");
    }

    let db_pool = db::create_pool(&config.database_url, &config.pool).await?;
    if config.run_migrations {
        db::run_migrations(&db_pool).await?;
    }

    let images = PexelsClient::new(config.pexels_api_key.clone(), config.image_lookup_timeout)?;
    if !images.is_enabled() {
        tracing::warn!("PEXELS_API_KEY not set; starthubs will be created without images");
    }

    let state = AppState::new(
        Arc::new(PgRepository::new(db_pool)),
        TokenService::new(&config.jwt_secret, config.token_ttl),
        Arc::new(images),
    );

    let app = with_request_timeout(create_app(state), config.request_timeout);

    tracing::info!(addr = %config.server_addr, "listening");
    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
