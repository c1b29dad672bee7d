//! Pumpkinfest RSVP backend server.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pumpkinfest_rsvp::config::Config;
use pumpkinfest_rsvp::db::{self, DriveStore, SheetRepository};
use pumpkinfest_rsvp::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Pumpkinfest RSVP backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Gallery folder: {}", config.folder_id);
    tracing::info!("Public URL: {}", config.public_url);

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(SheetRepository::new(pool.clone()));
    let drive = Arc::new(DriveStore::new(
        pool,
        config.folder_id.clone(),
        config.public_url.clone(),
    ));

    let existing = repo.get_rsvps().await?;
    tracing::info!("Sheet holds {} RSVPs", existing.rsvps.len());

    let state = AppState {
        repo,
        drive,
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
