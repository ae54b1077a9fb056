use std::net::SocketAddr;
use std::path::Path;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod db;
mod domain;
mod error;
mod parser;
mod rest;

const DEFAULT_CSV_PATH: &str = "data/swift_codes.csv";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Setting up database");
    let store = db::BankStore::init().await?;

    // Seed once, only into an empty store
    if store.is_empty().await? {
        let csv_path =
            std::env::var("SWIFT_CSV_PATH").unwrap_or_else(|_| DEFAULT_CSV_PATH.to_string());
        info!("Database is empty, seeding from {}", csv_path);

        let records = parser::parse_swift_csv(Path::new(&csv_path))
            .with_context(|| format!("seeding from {}", csv_path))?;
        let stored = store.insert_all(&records).await;
        info!("Seeded {} of {} parsed records", stored, records.len());
    }

    let state = rest::AppState::new(store);
    let app = rest::router(state);

    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
        .parse()
        .context("invalid BIND_ADDR")?;
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
