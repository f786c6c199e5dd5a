mod common;

use axum::http::{header, StatusCode};
use axum::Router;
use common::*;
use tempfile::TempDir;
use volume_check::{file_app, AppConfig, FileStore};

fn app() -> (TempDir, Router) {
    let td = TempDir::new().unwrap();
    let config = AppConfig::new(td.path());
    config.ensure_upload_dir().unwrap();
    let store = FileStore::new(config.visits_file(), config.upload_dir());
    (td, file_app::router(config, store))
}

async fn health(app: &Router) -> serde_json::Value {
    let response = send(app, get("/health")).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

fn stored_name(message: &str) -> String {
    message
        .strip_prefix("File uploaded successfully as ")
        .unwrap_or_else(|| panic!("upload was not accepted: {message}"))
        .to_string()
}

#[tokio::test]
async fn missing_visit_log_reads_as_zero() {
    let (_td, app) = app();
    let health = health(&app).await;
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["visits"], 0);
    assert_eq!(health["files"], 0);
    assert_eq!(health["visits_file_exists"], false);
}

#[tokio::test]
async fn every_home_load_appends_one_line() {
    let (td, app) = app();

    for (i, uri) in ["/", "/?message=x", "/?message=%E2%9C%93"].iter().enumerate() {
        let html = body_text(send(&app, get(uri)).await).await;
        assert_eq!(stat_numbers(&html)[0], (i + 1).to_string());
    }

    let log = std::fs::read_to_string(td.path().join("visits.txt")).unwrap();
    assert_eq!(log.lines().count(), 3);
    assert_eq!(health(&app).await["visits"], 3);
}

#[tokio::test]
async fn allowed_upload_is_stored_with_timestamp_prefix() {
    let (td, app) = app();

    let response = send(&app, post_multipart("/upload", "file", "holiday photo.JPG", b"jpegdata")).await;
    let name = stored_name(&redirect_message(&response));

    assert_ne!(name, "holiday photo.JPG");
    assert!(name.ends_with("_holiday_photo.JPG"), "got {name}");
    let (date, rest) = name.split_at(8);
    assert!(date.chars().all(|c| c.is_ascii_digit()));
    assert!(rest.starts_with('_') && rest[1..7].chars().all(|c| c.is_ascii_digit()));

    assert_eq!(
        std::fs::read(td.path().join("uploads").join(&name)).unwrap(),
        b"jpegdata"
    );
    assert_eq!(health(&app).await["files"], 1);
}

#[tokio::test]
async fn disallowed_extension_is_rejected() {
    let (_td, app) = app();

    let response = send(&app, post_multipart("/upload", "file", "setup.exe", b"MZ")).await;
    let message = redirect_message(&response);
    assert!(message.contains("not allowed"), "got {message}");
    assert_eq!(health(&app).await["files"], 0);
}

#[tokio::test]
async fn empty_filename_and_missing_part_are_rejected() {
    let (_td, app) = app();

    let response = send(&app, post_multipart("/upload", "file", "", b"")).await;
    assert_eq!(redirect_message(&response), "No file selected");

    let response = send(&app, post_multipart("/upload", "attachment", "a.txt", b"x")).await;
    assert_eq!(redirect_message(&response), "No file part");

    assert_eq!(health(&app).await["files"], 0);
}

#[tokio::test]
async fn uploaded_file_downloads_as_attachment() {
    let (_td, app) = app();
    let response = send(&app, post_multipart("/upload", "file", "notes.txt", b"remember me")).await;
    let name = stored_name(&redirect_message(&response));

    let response = send(&app, get(&format!("/download/{name}"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_DISPOSITION], "attachment");
    assert_eq!(body_text(response).await, "remember me");

    let html = body_text(send(&app, get("/")).await).await;
    assert!(html.contains(&format!("href=\"/download/{name}\"")));
}

#[tokio::test]
async fn unknown_download_is_not_found() {
    let (_td, app) = app();
    let response = send(&app, get("/download/nope.txt")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().get(header::CONTENT_DISPOSITION).is_none());
}

#[tokio::test]
async fn health_agrees_with_rendered_page() {
    let (_td, app) = app();
    send(&app, post_multipart("/upload", "file", "a.pdf", b"%PDF")).await;
    send(&app, get("/")).await;

    let html = body_text(send(&app, get("/")).await).await;
    let stats = stat_numbers(&html);
    let health = health(&app).await;

    assert_eq!(stats[0], health["visits"].to_string());
    assert_eq!(stats[1], health["files"].to_string());
    assert_eq!(stats[2], "✅ YES");
    assert_eq!(health["visits_file_exists"], true);
}

#[tokio::test]
async fn repeated_message_param_still_records_visit() {
    let (_td, app) = app();
    let response = send(&app, get("/?message=first&message=second")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("<div class=\"info-box success\">\n            first\n"));
    assert!(!html.contains("second"));
    assert_eq!(health(&app).await["visits"], 1);
}
