//! Two small web services for checking that a container's storage volume
//! survives a redeploy, plus the pieces they share.
//!
//! - [`sqlite_app`] keeps users and visits in `<STORAGE_PATH>/app.db`.
//! - [`file_app`] appends visits to `<STORAGE_PATH>/visits.txt` and keeps
//!   uploads in `<STORAGE_PATH>/uploads/`.

pub mod config;
pub mod error;
pub mod file_app;
pub mod file_models;
pub mod file_storage;
pub mod logging;
pub mod models;
pub mod server;
pub mod snapshot;
pub mod sqlite_app;
pub mod storage;
pub mod upload;
pub mod view;

pub use config::AppConfig;
pub use file_storage::FileStore;
pub use storage::RecordStore;
