use anyhow::{Context, Result};
use tracing::{error, info};
use volume_check::{logging, server, sqlite_app, AppConfig, RecordStore};

#[tokio::main]
async fn main() {
    logging::init();
    info!("Starting sqlite-app v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run().await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = AppConfig::from_env().context("Failed to load configuration")?;
    config.ensure_storage_dir()?;
    info!("STORAGE_PATH: {}", config.storage_path.display());
    info!("DATABASE_PATH: {}", config.db_path().display());

    let store = RecordStore::connect(config.db_path())
        .await
        .context("Failed to initialize database")?;

    let app = sqlite_app::router(config.clone(), store);
    server::serve(&config, app, &sqlite_app::ENDPOINTS).await
}
