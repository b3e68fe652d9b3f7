//! # Tasklist API Server
//!
//! REST backend for personal task lists: users register, log in with a
//! bearer token and manage their own tasks; administrators manage every
//! user and task.
//!
//! ## Startup
//!
//! 1. Load configuration from the environment (`.env` supported)
//! 2. Connect to PostgreSQL and run the embedded migrations
//! 3. Optionally seed demo data (`SEED_DEMO_DATA=true`)
//! 4. Serve until Ctrl+C, then drain connections and close the pool
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p tasklist-api
//! ```

use anyhow::Context;
use tasklist_api::{
    app::{build_router, AppState},
    config::{Config, LogFormat},
};
use tasklist_shared::db::{
    migrations::{get_migration_status, run_migrations},
    pool::{close_pool, create_pool, DatabaseConfig},
    seed::seed_demo_data,
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tasklist_api=debug,tasklist_shared=info,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    tracing::info!(
        "Tasklist API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await
    .context("failed to connect to the database")?;

    run_migrations(&pool)
        .await
        .context("failed to run database migrations")?;
    let migrations = get_migration_status(&pool)
        .await
        .context("failed to read migration status")?;
    tracing::info!(
        applied = migrations.applied_migrations,
        latest = ?migrations.latest_version,
        up_to_date = migrations.is_up_to_date(),
        "Database schema ready"
    );

    let seed = config.seed_demo_data;
    let bind_address = config.bind_address();
    let state = AppState::new(pool.clone(), config).context("invalid password hash cost")?;

    if seed {
        seed_demo_data(
            state.user_store.as_ref(),
            state.task_store.as_ref(),
            state.hasher.as_ref(),
        )
        .await
        .context("failed to seed demo data")?;
    }

    let app = build_router(state);

    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, exiting...");
}
