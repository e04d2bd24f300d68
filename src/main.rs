use std::{net::SocketAddr, sync::Arc};

use sqlx::postgres::PgPoolOptions;
use tracing::info;

use booking_auth::{
    build_router,
    config::AuthConfig,
    services::{PgAuditSink, PgOwnershipLookup, PgRecordStore, RedisSessionStore},
    telemetry, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AuthConfig::from_env()?;
    telemetry::init_telemetry(
        &config.service_name,
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    sqlx::migrate!().run(&pool).await?;

    let store = Arc::new(PgRecordStore::new(pool.clone()));
    let sessions = Arc::new(RedisSessionStore::new(&config.redis, config.session.ttl_seconds).await?);
    let ownership = Arc::new(PgOwnershipLookup::new(pool.clone()));
    let audit = Arc::new(PgAuditSink::new(pool));

    let port = config.port;
    let state = AppState::new(config, store, sessions, ownership, audit)?;
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "booking-auth listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
