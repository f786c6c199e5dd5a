use anyhow::{Context, Result};
use tracing::{error, info};
use volume_check::{file_app, logging, server, AppConfig, FileStore};

#[tokio::main]
async fn main() {
    logging::init();
    info!("Starting file-app v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run().await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = AppConfig::from_env().context("Failed to load configuration")?;
    config.ensure_storage_dir()?;
    config.ensure_upload_dir()?;
    info!("STORAGE_PATH: {}", config.storage_path.display());
    info!("VISITS_FILE: {}", config.visits_file().display());
    info!("UPLOAD_DIR: {}", config.upload_dir().display());

    let store = FileStore::new(config.visits_file(), config.upload_dir());
    let app = file_app::router(config.clone(), store);
    server::serve(&config, app, &file_app::ENDPOINTS).await
}
