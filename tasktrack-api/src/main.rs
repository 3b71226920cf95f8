//! # TaskTrack API Server
//!
//! Multi-user task tracker: registration and login with bearer tokens,
//! per-user tasks with subtasks, categories, and dashboard statistics.
//!
//! ## Storage
//!
//! With `DATABASE_URL` set the server connects to PostgreSQL and applies
//! pending migrations before accepting requests. Without it the server runs on
//! a volatile in-memory store.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/tasktrack JWT_SECRET=$(openssl rand -hex 32) \
//!     cargo run -p tasktrack-api
//! ```

use std::sync::Arc;

use anyhow::Context;
use tasktrack_api::{
    app::{build_router, AppState},
    config::Config,
};
use tasktrack_shared::{
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    store::{memory::MemoryStore, postgres::PgStore, SharedStore},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "tasktrack_api=debug,tasktrack_shared=debug,tower_http=debug".into()
    });
    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(
        "TaskTrack API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let (store, pool) = match config.database.url.clone() {
        Some(url) => {
            let pool = create_pool(DatabaseConfig {
                url,
                max_connections: config.database.max_connections,
                ..Default::default()
            })
            .await
            .context("Failed to connect to PostgreSQL")?;

            run_migrations(&pool)
                .await
                .context("Failed to apply migrations")?;

            let store: SharedStore = Arc::new(PgStore::new(pool.clone()));
            (store, Some(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL is not set; using the in-memory store, data will not persist");
            let store: SharedStore = Arc::new(MemoryStore::new());
            (store, None)
        }
    };

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = pool {
        close_pool(pool).await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal; running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
