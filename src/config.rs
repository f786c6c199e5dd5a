use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const DEFAULT_STORAGE_PATH: &str = "/app/storage";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";

const DB_FILE: &str = "app.db";
const VISITS_FILE: &str = "visits.txt";
const UPLOAD_DIR: &str = "uploads";

/// Runtime configuration, resolved once at startup and handed to the stores.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage_path: PathBuf,
    pub port: u16,
    pub bind_host: String,
}

impl AppConfig {
    pub fn new(storage_path: impl Into<PathBuf>) -> Self {
        Self {
            storage_path: storage_path.into(),
            port: DEFAULT_PORT,
            bind_host: DEFAULT_BIND_HOST.to_string(),
        }
    }

    /// Reads `STORAGE_PATH`, `PORT` and `BIND_HOST`, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        let storage_path = std::env::var("STORAGE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORAGE_PATH));

        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("Invalid PORT value: {}", raw))?,
            Err(_) => DEFAULT_PORT,
        };

        let bind_host =
            std::env::var("BIND_HOST").unwrap_or_else(|_| DEFAULT_BIND_HOST.to_string());

        Ok(Self {
            storage_path,
            port,
            bind_host,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.bind_host, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.bind_host, self.port))
    }

    pub fn db_path(&self) -> PathBuf {
        self.storage_path.join(DB_FILE)
    }

    pub fn visits_file(&self) -> PathBuf {
        self.storage_path.join(VISITS_FILE)
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.storage_path.join(UPLOAD_DIR)
    }

    pub fn ensure_storage_dir(&self) -> Result<()> {
        create_dir(&self.storage_path)
    }

    pub fn ensure_upload_dir(&self) -> Result<()> {
        create_dir(&self.upload_dir())
    }
}

fn create_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_paths_live_under_storage_path() {
        let config = AppConfig::new("/data/vol");
        assert_eq!(config.db_path(), PathBuf::from("/data/vol/app.db"));
        assert_eq!(config.visits_file(), PathBuf::from("/data/vol/visits.txt"));
        assert_eq!(config.upload_dir(), PathBuf::from("/data/vol/uploads"));
    }

    #[test]
    fn defaults_bind_on_all_interfaces() {
        let config = AppConfig::new(DEFAULT_STORAGE_PATH);
        let addr = config.bind_addr().unwrap();
        assert_eq!(addr.port(), 5000);
        assert!(addr.ip().is_unspecified());
    }

    #[test]
    fn rejects_garbage_host() {
        let mut config = AppConfig::new("/tmp");
        config.bind_host = "not a host".to_string();
        assert!(config.bind_addr().is_err());
    }

    #[test]
    fn ensure_upload_dir_creates_nested_dirs() {
        let td = tempfile::TempDir::new().unwrap();
        let config = AppConfig::new(td.path().join("a").join("b"));
        config.ensure_upload_dir().unwrap();
        assert!(config.upload_dir().is_dir());
    }
}
