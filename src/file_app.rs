//! File-store variant: a flat visit log and an upload directory.

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::file_models::{FileHealth, UploadOutcome};
use crate::file_storage::FileStore;
use crate::server::{message_param, redirect_with_message};
use crate::view::FilePage;
use axum::{
    extract::{DefaultBodyLimit, Multipart, RawQuery, State},
    http::{header::CONTENT_DISPOSITION, HeaderValue, Response},
    response::{Html, Redirect},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeader;
use tracing::{debug, info};

pub const RECENT_VISITS_LIMIT: usize = 10;
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;
const FILE_FIELD: &str = "file";

pub const ENDPOINTS: [&str; 4] = [
    "GET  /                    - Status page (records a visit)",
    "POST /upload              - Upload a file (multipart field 'file')",
    "GET  /download/<filename> - Download an uploaded file",
    "GET  /health              - Counts as JSON",
];

pub struct AppState {
    pub config: AppConfig,
    pub store: FileStore,
}

pub fn router(config: AppConfig, store: FileStore) -> Router {
    let downloads = SetResponseHeader::overriding(
        ServeDir::new(store.upload_dir()),
        CONTENT_DISPOSITION,
        attachment_disposition::<tower_http::services::fs::ServeFileSystemResponseBody>,
    );

    let state = Arc::new(AppState { config, store });
    Router::new()
        .route("/", get(index))
        .route(
            "/upload",
            post(upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/health", get(health))
        .nest_service("/download", downloads)
        .with_state(state)
}

fn attachment_disposition<B>(response: &Response<B>) -> Option<HeaderValue> {
    response
        .status()
        .is_success()
        .then(|| HeaderValue::from_static("attachment"))
}

async fn index(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> AppResult<Html<String>> {
    let message = message_param(query.as_deref());
    let stamp = state.store.record_visit().await?;
    debug!(%stamp, "Recorded visit");

    let visit_count = state.store.count_visits().await?;
    let recent_visits = state.store.recent_visits(RECENT_VISITS_LIMIT).await?;
    let files = state.store.list_files().await?;

    let page = FilePage {
        message: message.as_deref(),
        visit_count,
        file_count: files.len(),
        visits_file_exists: state.store.visits_file_exists(),
        upload_dir_exists: state.store.upload_dir_exists(),
        files: &files,
        recent_visits: &recent_visits,
        storage_path: &state.config.storage_path,
        visits_file: state.store.visits_file(),
        upload_dir: state.store.upload_dir(),
    };
    Ok(Html(page.render()))
}

async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> AppResult<Redirect> {
    let mut outcome = UploadOutcome::MissingPart;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await?;
        outcome = state.store.save_upload(&filename, &data).await?;
        break;
    }

    match &outcome {
        UploadOutcome::Stored(name) => info!(%name, "File stored"),
        rejected => info!(?rejected, "Upload rejected"),
    }
    Ok(redirect_with_message(&outcome.message()))
}

async fn health(State(state): State<Arc<AppState>>) -> AppResult<Json<FileHealth>> {
    Ok(Json(FileHealth {
        status: "healthy".to_string(),
        visits: state.store.count_visits().await?,
        files: state.store.count_files().await?,
        visits_file_exists: state.store.visits_file_exists(),
    }))
}
