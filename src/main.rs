use basket_buddy::{
    bot,
    config::{catalogue, database},
    core::shop::{CatalogueEvent, Shop},
    errors::{Error, Result},
};
use dotenvy::dotenv;
use std::env;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the catalogue configuration
    let app_config = catalogue::load_default_config()
        .inspect_err(|e| error!("Critical error loading application configuration: {e}"))?;
    let source = app_config.catalogue.to_source()?;
    info!(
        "Catalogue source: {} (delimiter {:?})",
        source.path().display(),
        app_config.catalogue.delimiter
    );

    // 4. Initialize database
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {e}"))?;

    // 5. Load the catalogue on first run
    let shop = Shop::new(db, source);
    spawn_event_logger(shop.subscribe());
    shop.ensure_catalogue()
        .await
        .inspect_err(|e| error!("Failed to load initial catalogue: {e}"))?;

    // 6. Run the bot
    // DISCORD_BOT_TOKEN is loaded here, directly before use, not stored in config
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {e}"))
        .map_err(Error::EnvVar)?;

    bot::run_bot(token, shop).await
}

/// Logs every catalogue change until the shop is dropped.
fn spawn_event_logger(mut events: broadcast::Receiver<CatalogueEvent>) {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(CatalogueEvent::Reloaded(report)) => info!(
                    inserted = report.inserted,
                    skipped_malformed = report.skipped_malformed,
                    skipped_invalid = report.skipped_invalid,
                    "Catalogue changed"
                ),
                Err(RecvError::Lagged(missed)) => warn!("Missed {missed} catalogue events"),
                Err(RecvError::Closed) => break,
            }
        }
    });
}
