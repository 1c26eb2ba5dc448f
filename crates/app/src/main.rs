use std::{sync::Arc, time::Duration};

use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

// OCR.space's public demo key; rate limited, fine for trying things out.
const DEMO_OCR_KEY: &str = "helloworld";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "canteiro={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let server = settings.server;
    tracing::info!("Initializing database...");
    let db = parse_database(&server.database).await?;

    let ttl = Duration::from_secs(server.cache_ttl_secs.unwrap_or(30));
    let cache = Arc::new(server::ListingCache::new(ttl));
    let ledger = Arc::new(
        engine::Ledger::new(engine::DatabaseStore::new(db)).with_read_cache(cache.clone()),
    );
    let ocr = Arc::new(match server.ocr {
        Some(ocr) => server::OcrClient::new(ocr.endpoint, ocr.api_key),
        None => server::OcrClient::new(None, DEMO_OCR_KEY.to_string()),
    });

    let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    server::run_with_listener(server::ServerState { ledger, cache, ocr }, listener).await?;

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
