//! Person server: reads settings from env (and `.env`), builds the configured store,
//! and serves the person routes.
//!
//! Run from repo root: `cargo run -p person-server`
//! Without PostgreSQL: `PERSON_STORE=memory cargo run -p person-server`

use person_service::{
    app, apply_migrations, ensure_database_exists, AppState, MemoryPersonStore, PgPersonStore,
    ServiceConfig, StoreKind,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("person_service=info,person_server=info")),
        )
        .init();

    let config = ServiceConfig::from_env()?;
    let state = build_state(&config).await?;

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!(store = ?config.store, "listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn build_state(config: &ServiceConfig) -> Result<AppState, Box<dyn std::error::Error>> {
    match config.store {
        StoreKind::Memory => {
            tracing::info!("using in-memory person store; data is lost on exit");
            Ok(AppState::new(MemoryPersonStore::new()))
        }
        StoreKind::Postgres => {
            ensure_database_exists(&config.database_url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(&config.database_url)
                .await?;
            apply_migrations(&pool, &config.schema).await?;
            Ok(AppState::new(PgPersonStore::new(pool, &config.schema)))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
