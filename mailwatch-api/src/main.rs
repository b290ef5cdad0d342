//! # MailWatch API Server
//!
//! HTTP API for MailWatch: account management, tracked email addresses with
//! mailed verification links, an in-app notification feed, and QR code
//! generation.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p mailwatch-api
//! ```

use mailwatch_api::{
    app::{build_router, AppState},
    config::Config,
};
use mailwatch_shared::{
    db::{migrations, pool},
    mail::Mailer,
    media::store::AvatarStore,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailwatch_api=debug,mailwatch_shared=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "MailWatch API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    // Database: create if missing, connect, migrate
    migrations::ensure_database_exists(&config.database.url).await?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    migrations::run_migrations(&db).await?;

    let mailer = Mailer::from_config(&config.mailer_config())?;
    let avatars = AvatarStore::new(&config.media.root);

    let bind_address = config.bind_address();
    let state = AppState::new(db, config, mailer, avatars);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
